// Heatmap as a texture for a plane in a 3D scene.
// The raster is sized to the bounding box of the data and the plane is scaled
// to the same extent, so one texel maps to one data unit. The scene itself is
// the host's business: it reads `texture()` and re-uploads when the revision moves.

use crate::error::Result;
use crate::heatmap::Heatmap;
use crate::types::{Bounds, WeightedPoint};

/// Normalization maximum used for plane data.
pub const PLANE_MAX_INTENSITY: f32 = 2000.0;

/// What a host renderer needs to put the heatmap on a plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneTexture<'a> {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub pixels: &'a [u8],
    /// Plane scale (x, y, z).
    pub scale: [f32; 3],
    /// Bumped on every update; re-upload when it changes.
    pub revision: u64,
}

pub struct HeatmapPlane {
    heatmap: Heatmap,
    bounds: Bounds,
    revision: u64,
}

impl HeatmapPlane {
    pub fn new() -> Result<Self> {
        Self::with_heatmap(Heatmap::new(0, 0)?)
    }

    /// Wrap a heatmap that already has its gradient and stamp set.
    /// Its max intensity is replaced by the plane's own (2000).
    pub fn with_heatmap(mut heatmap: Heatmap) -> Result<Self> {
        heatmap.set_max_intensity(PLANE_MAX_INTENSITY)?;
        Ok(Self { heatmap, bounds: Bounds::default(), revision: 0 })
    }

    /// Fit the raster to the data, redraw, and mark the texture dirty.
    pub fn update(&mut self, points: &[WeightedPoint]) -> Result<PlaneTexture<'_>> {
        let bounds = Bounds::from_points(points);
        let (w, h) = raster_size(&bounds);
        if (w, h) != (self.heatmap.width(), self.heatmap.height()) {
            tracing::debug!(width = w, height = h, "resizing plane raster");
            self.heatmap.resize(w, h)?;
        }
        self.bounds = bounds;

        self.heatmap.set_points(points.iter().copied());
        self.heatmap.draw(Some(0.0))?;
        self.revision += 1;
        Ok(self.texture())
    }

    pub fn texture(&self) -> PlaneTexture<'_> {
        let raster = self.heatmap.raster();
        PlaneTexture {
            width: raster.width(),
            height: raster.height(),
            pixels: raster.as_bytes(),
            scale: [self.bounds.width(), self.bounds.height(), 1.0],
            revision: self.revision,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }
}

/// Whole-pixel raster size for the bounds; fractions are dropped, as a canvas does.
fn raster_size(bounds: &Bounds) -> (u32, u32) {
    let side = |v: f32| if v.is_finite() && v > 0.0 { v.trunc() as u32 } else { 0 }; // NaN/inf -> empty
    (side(bounds.width()), side(bounds.height()))
}
