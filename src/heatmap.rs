// The heatmap rasterizer.
// Every point dabs the soft stamp into an opacity plane (alpha-over, so dense
// clusters saturate toward 1.0), then each pixel's opacity picks its color
// from the 256-entry gradient table.

use crate::error::{Error, Result};
use crate::gradient::{Gradient, GradientStop, GradientTable};
use crate::stamp::{DEFAULT_BLUR, DEFAULT_RADIUS, StampMask};
use crate::types::{Raster, WeightedPoint};

pub const DEFAULT_MAX_INTENSITY: f32 = 100.0;
/// Opacity floor used when `draw` is given no explicit minimum.
pub const DEFAULT_MIN_OPACITY: f32 = 0.05;

pub struct Heatmap {
    raster: Raster,
    alpha: Vec<f32>, // accumulated opacity, one per pixel, 0..1
    max_intensity: f32,
    stamp: StampMask,
    gradient: Gradient,
    table: GradientTable,
    points: Vec<WeightedPoint>,
}

impl Heatmap {
    /// A `width` x `height` heatmap with the default stamp, gradient and max intensity.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let raster = Raster::new(width, height)?;
        let alpha = alloc_alpha(width, height)?;
        let gradient = Gradient::default();
        let table = gradient.to_table();
        Ok(Self {
            raster,
            alpha,
            max_intensity: DEFAULT_MAX_INTENSITY,
            stamp: StampMask::new(DEFAULT_RADIUS, DEFAULT_BLUR)?,
            gradient,
            table,
            points: Vec::new(),
        })
    }

    /* ---------- configuration ---------- */

    /// Values are divided by `max` before clamping to [0, 1].
    pub fn set_max_intensity(&mut self, max: f32) -> Result<()> {
        if !max.is_finite() || max <= 0.0 {
            return Err(Error::InvalidConfig(format!("max intensity must be > 0, got {max}")));
        }
        self.max_intensity = max;
        Ok(())
    }

    /// Rebuild the stamp. The previous stamp is kept if the parameters are rejected.
    pub fn set_stamp_radius(&mut self, radius: f32, blur: f32) -> Result<()> {
        self.stamp = StampMask::new(radius, blur)?;
        Ok(())
    }

    /// Rebuild the gradient table from stops in any order.
    pub fn set_gradient(&mut self, stops: impl IntoIterator<Item = GradientStop>) -> Result<()> {
        self.apply_gradient(Gradient::new(stops)?);
        Ok(())
    }

    /// Same as [`set_gradient`](Self::set_gradient) with CSS color strings.
    pub fn set_gradient_css<'a>(&mut self, stops: impl IntoIterator<Item = (f32, &'a str)>) -> Result<()> {
        self.apply_gradient(Gradient::from_css(stops)?);
        Ok(())
    }

    fn apply_gradient(&mut self, gradient: Gradient) {
        self.table = gradient.to_table();
        self.gradient = gradient;
    }

    /// New dimensions; the next draw starts from a blank raster.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let raster = Raster::new(width, height)?;
        self.alpha = alloc_alpha(width, height)?;
        self.raster = raster;
        Ok(())
    }

    /* ---------- points ---------- */

    pub fn set_points<P: Into<WeightedPoint>>(&mut self, points: impl IntoIterator<Item = P>) {
        self.points.clear();
        self.add_points(points);
    }

    pub fn add_points<P: Into<WeightedPoint>>(&mut self, points: impl IntoIterator<Item = P>) {
        self.points.extend(points.into_iter().map(Into::into));
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    /* ---------- drawing ---------- */

    /// Re-render the whole raster from the current points and configuration.
    /// `min_opacity` is the floor for each point's opacity (0.05 when `None`).
    pub fn draw(&mut self, min_opacity: Option<f32>) -> Result<&Raster> {
        let floor = min_opacity.unwrap_or(DEFAULT_MIN_OPACITY);
        if floor.is_nan() {
            return Err(Error::InvalidConfig("min opacity is NaN".into()));
        }

        let width = self.raster.width() as usize;
        let height = self.raster.height() as usize;

        // 1) Grayscale pass: one stamp per point, in insertion order.
        self.alpha.fill(0.0);
        for p in &self.points {
            let a = point_alpha(p.value, self.max_intensity, floor);
            dab_stamp(&mut self.alpha, width, height, &self.stamp, p.x, p.y, a);
        }

        // 2) Colorize: opacity -> gradient color; untouched pixels stay transparent black.
        colorize(&self.alpha, &self.table, self.raster.as_bytes_mut());

        tracing::debug!(points = self.points.len(), width, height, "heatmap drawn");
        Ok(&self.raster)
    }

    /* ---------- accessors ---------- */

    /// Output of the last draw (transparent before the first one).
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn max_intensity(&self) -> f32 {
        self.max_intensity
    }

    pub fn stamp(&self) -> &StampMask {
        &self.stamp
    }

    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    pub fn gradient_table(&self) -> &GradientTable {
        &self.table
    }

    pub fn points(&self) -> &[WeightedPoint] {
        &self.points
    }
}

fn alloc_alpha(width: u32, height: u32) -> Result<Vec<f32>> {
    let n = width as usize * height as usize;
    let mut v = Vec::new();
    v.try_reserve_exact(n).map_err(|_| Error::SurfaceUnavailable { width, height })?;
    v.resize(n, 0.0);
    Ok(v)
}

/// Normalized opacity of one point: value/max, raised to the floor, clamped to [0, 1].
#[inline]
pub fn point_alpha(value: f32, max_intensity: f32, min_opacity: f32) -> f32 {
    (value / max_intensity).max(min_opacity).clamp(0.0, 1.0)
}

/// Draw the stamp centered at (cx, cy) with global opacity `global_alpha`,
/// using source-over: dst = src + dst * (1 - src).
/// The stamp's corner snaps to `round(c - side/2)`; parts off the raster are skipped.
/// Visual: one soft blob; where blobs overlap the spot gets denser, never past 1.0.
fn dab_stamp(
    alpha: &mut [f32],
    width: usize,
    height: usize,
    stamp: &StampMask,
    cx: f32,
    cy: f32,
    global_alpha: f32,
) {
    if global_alpha <= 0.0 || !cx.is_finite() || !cy.is_finite() {
        return; // nothing visible, or nowhere to put it
    }
    let half = stamp.half_size();
    let side = stamp.side() as f64;
    let (w, h) = (width as f64, height as f64);

    // 1) Snap the stamp's top-left corner to a whole pixel (still in f64).
    let fx = (cx as f64 - half as f64).round();
    let fy = (cy as f64 - half as f64).round();

    // 2) Drop stamps that can't touch the raster before any integer casts,
    //    so far-away points can't overflow the index math below.
    if fx + side <= 0.0 || fy + side <= 0.0 || fx >= w || fy >= h {
        return;
    }
    let (ox, oy, side) = (fx as i64, fy as i64, side as i64);

    // 3) Intersect the stamp square with the raster once, then walk only that.
    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = (ox + side).min(width as i64);
    let y1 = (oy + side).min(height as i64);

    for sy in y0..y1 {
        let row = sy as usize * width; // raster row start
        let ky = (sy - oy) as usize; // stamp row
        for sx in x0..x1 {
            let kx = (sx - ox) as usize; // stamp column
            let src = stamp.weight(kx, ky) * global_alpha;
            let dst = &mut alpha[row + sx as usize];
            *dst = src + *dst * (1.0 - src); // "over": saturates instead of summing
        }
    }
}

/// Quantize opacity to 8 bits and color every non-zero pixel from the table.
/// Visual: faint fringes take the cool end of the ramp, dense cores the hot end.
fn colorize(alpha: &[f32], table: &GradientTable, pixels: &mut [u8]) {
    for (a, px) in alpha.iter().zip(pixels.chunks_exact_mut(4)) {
        // 1) Opacity -> 0..255; this byte is both the pixel's alpha and the table index.
        let a8 = (a * 255.0).round().clamp(0.0, 255.0) as u8;

        // 2) Zero opacity stays transparent black (no stray color at the edges).
        if a8 == 0 {
            px.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }

        // 3) RGB from the gradient, alpha from the accumulated opacity.
        let c = table.lookup(a8);
        px.copy_from_slice(&[c.r, c.g, c.b, a8]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;

    fn drawn(points: &[(f32, f32, f32)], min_opacity: Option<f32>) -> Raster {
        let mut hm = Heatmap::new(100, 100).unwrap();
        hm.set_points(points.iter().copied());
        hm.draw(min_opacity).unwrap().clone()
    }

    #[test]
    fn single_full_point_is_red_and_opaque() {
        let r = drawn(&[(10.0, 10.0, 100.0)], Some(0.0));
        let px = r.pixel(10, 10).unwrap();
        assert!(px.a >= 254, "alpha {}", px.a);
        assert_eq!((px.r, px.g, px.b), (255, 0, 0));
    }

    #[test]
    fn overlapping_half_stamps_accumulate_over_not_sum() {
        let r = drawn(&[(50.0, 50.0, 50.0), (50.0, 50.0, 50.0)], Some(0.0));
        let a = r.pixel(50, 50).unwrap().a as i32;
        // 1 - (1-0.5)*(1-0.5) = 0.75 -> 191
        assert!((a - 191).abs() <= 1, "alpha {a}");
    }

    #[test]
    fn zero_value_points_use_min_opacity() {
        let r = drawn(&[(50.0, 50.0, 0.0)], None);
        let a = r.pixel(50, 50).unwrap().a;
        assert_eq!(a, (DEFAULT_MIN_OPACITY * 255.0).round() as u8);

        let r = drawn(&[(50.0, 50.0, 0.0)], Some(0.0));
        assert!(r.is_transparent());
    }

    #[test]
    fn alpha_clamps_at_max_intensity() {
        assert_eq!(point_alpha(100.0, 100.0, 0.0), 1.0);
        assert_eq!(point_alpha(5000.0, 100.0, 0.0), 1.0);
        assert_eq!(point_alpha(0.0, 100.0, 0.05), 0.05);
        assert_eq!(point_alpha(25.0, 100.0, 0.05), 0.25);
        assert_eq!(point_alpha(25.0, 100.0, 2.0), 1.0);
        assert_eq!(point_alpha(-10.0, 100.0, -1.0), 0.0);
    }

    #[test]
    fn untouched_pixels_stay_transparent_black() {
        let r = drawn(&[(10.0, 10.0, 100.0)], Some(0.0));
        // far corner is beyond the stamp's reach
        assert_eq!(r.pixel(99, 99), Some(Rgba::TRANSPARENT));
        for px in r.as_bytes().chunks_exact(4) {
            if px[3] == 0 {
                assert_eq!(px, [0, 0, 0, 0]);
            }
        }
    }

    #[test]
    fn draw_is_deterministic() {
        let mut hm = Heatmap::new(64, 48).unwrap();
        let pts: [(f32, f32, f32); 3] = [(5.0, 5.0, 30.0), (20.0, 30.0, 80.0), (21.0, 29.0, 10.0)];
        hm.set_points(pts);
        let first = hm.draw(None).unwrap().clone();
        let second = hm.draw(None).unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn clear_points_gives_transparent_raster() {
        let mut hm = Heatmap::new(40, 30).unwrap();
        hm.set_points([WeightedPoint::new(10.0, 10.0, 100.0)]);
        assert!(!hm.draw(None).unwrap().is_transparent());
        hm.clear_points();
        let r = hm.draw(None).unwrap();
        assert!(r.is_transparent());
        assert_eq!((r.width(), r.height()), (40, 30));
    }

    #[test]
    fn add_points_appends_and_set_points_replaces() {
        let mut hm = Heatmap::new(10, 10).unwrap();
        hm.add_points([(1.0_f32, 1.0_f32, 1.0_f32)]);
        hm.add_points([WeightedPoint::new(2.0, 2.0, 2.0)]);
        assert_eq!(hm.points().len(), 2);
        hm.set_points([[3.0_f32; 3]]);
        assert_eq!(hm.points(), &[WeightedPoint::new(3.0, 3.0, 3.0)]);
    }

    #[test]
    fn overlap_raises_density_monotonically() {
        let one = drawn(&[(50.0, 50.0, 30.0)], Some(0.0));
        let two = drawn(&[(50.0, 50.0, 30.0), (52.0, 50.0, 30.0)], Some(0.0));
        for (a, b) in one.as_bytes().chunks_exact(4).zip(two.as_bytes().chunks_exact(4)) {
            assert!(b[3] >= a[3]);
        }
    }

    #[test]
    fn stamps_off_the_edge_are_cropped() {
        let r = drawn(&[(-5.0, -5.0, 100.0), (500.0, 500.0, 100.0)], Some(0.0));
        assert!(r.pixel(0, 0).unwrap().a > 0);
        assert_eq!(r.pixel(99, 99), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn far_and_non_finite_points_are_skipped() {
        let mut hm = Heatmap::new(40, 40).unwrap();
        hm.set_points([
            WeightedPoint::new(1.0e30, 5.0, 50.0),
            WeightedPoint::new(5.0, f32::INFINITY, 50.0),
            WeightedPoint::new(-1.0e30, -1.0e30, 50.0),
            WeightedPoint::new(f32::NAN, 5.0, 50.0),
            WeightedPoint::new(f32::NEG_INFINITY, 5.0, 50.0),
        ]);
        assert!(hm.draw(Some(0.0)).unwrap().is_transparent());

        // a normal point next to them still draws
        hm.add_points([WeightedPoint::new(20.0, 20.0, 100.0)]);
        assert!(hm.draw(Some(0.0)).unwrap().pixel(20, 20).unwrap().a >= 254);
    }

    #[test]
    fn fractional_stamp_size_centers_on_the_point() {
        // side = ceil(2 * 3.3) = 7, so the corner lands at round(10 - 3.5) = 7
        let mut hm = Heatmap::new(24, 24).unwrap();
        hm.set_stamp_radius(2.3, 1.0).unwrap();
        assert_eq!(hm.stamp().side(), 7);
        assert_eq!(hm.stamp().half_size(), 3.5);
        hm.set_points([WeightedPoint::new(10.0, 10.0, 100.0)]);
        let r = hm.draw(Some(0.0)).unwrap();
        let a = |x: u32| r.pixel(x, 10).unwrap().a as i32;

        // covered columns are 7..=13, symmetric around column 10
        assert_eq!(a(6), 0);
        assert_eq!(a(14), 0);
        assert!(a(7) > 0);
        assert!((a(7) - a(13)).abs() <= 1);
        assert!((a(9) - a(11)).abs() <= 1);
        assert!(a(10) >= a(9));
        assert_eq!(a(10), 255);
    }

    #[test]
    fn resize_discards_content() {
        let mut hm = Heatmap::new(50, 50).unwrap();
        hm.set_points([WeightedPoint::new(10.0, 10.0, 100.0)]);
        hm.draw(Some(0.0)).unwrap();
        hm.resize(20, 10).unwrap();
        assert_eq!((hm.width(), hm.height()), (20, 10));
        assert!(hm.raster().is_transparent());
        assert_eq!(hm.draw(Some(0.0)).unwrap().as_bytes().len(), 20 * 10 * 4);
    }

    #[test]
    fn custom_gradient_colors_the_output() {
        let mut hm = Heatmap::new(30, 30).unwrap();
        hm.set_gradient_css([(0.0, "#000000"), (1.0, "white")]).unwrap();
        hm.set_points([WeightedPoint::new(15.0, 15.0, 100.0)]);
        let px = hm.draw(Some(0.0)).unwrap().pixel(15, 15).unwrap();
        assert_eq!((px.r, px.g, px.b), (255, 255, 255));
    }

    #[test]
    fn custom_radius_changes_reach() {
        let mut hm = Heatmap::new(100, 100).unwrap();
        hm.set_stamp_radius(5.0, 0.0).unwrap();
        hm.set_points([WeightedPoint::new(50.0, 50.0, 100.0)]);
        let r = hm.draw(Some(0.0)).unwrap();
        assert_eq!(r.pixel(50, 50).unwrap().a, 255);
        assert_eq!(r.pixel(50, 60).unwrap().a, 0);
    }

    #[test]
    fn invalid_setters_are_rejected_and_keep_state() {
        let mut hm = Heatmap::new(10, 10).unwrap();
        assert!(matches!(hm.set_max_intensity(0.0), Err(Error::InvalidConfig(_))));
        assert!(hm.set_max_intensity(-1.0).is_err());
        assert!(hm.set_max_intensity(f32::NAN).is_err());
        assert_eq!(hm.max_intensity(), DEFAULT_MAX_INTENSITY);

        assert!(hm.set_stamp_radius(-1.0, 2.0).is_err());
        assert_eq!(hm.stamp().side(), 80);

        assert!(hm.set_gradient(Vec::<GradientStop>::new()).is_err());
        assert_eq!(hm.gradient(), &Gradient::default());

        assert!(hm.draw(Some(f32::NAN)).is_err());
    }

    #[test]
    fn oversized_resize_fails_and_keeps_raster() {
        let mut hm = Heatmap::new(8, 8).unwrap();
        assert!(matches!(hm.resize(u32::MAX, 2), Err(Error::SurfaceUnavailable { .. })));
        assert_eq!((hm.width(), hm.height()), (8, 8));
    }
}
