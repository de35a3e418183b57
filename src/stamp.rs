// The soft circular "stamp" dabbed into the heatmap at every data point.
// Built once per (radius, blur): a filled disc, then a separable Gaussian blur,
// cropped to a square of side 2*(radius+blur).

use crate::error::{Error, Result};
use crate::types::MAX_RASTER_SIDE;

pub const DEFAULT_RADIUS: f32 = 25.0;
pub const DEFAULT_BLUR: f32 = 15.0;

/// Sub-pixel samples per axis when rasterizing the disc edge.
const DISC_SUBSAMPLES: usize = 4;

/// Square opacity image, row-major, peak 1.0 at the center.
#[derive(Debug, Clone, PartialEq)]
pub struct StampMask {
    radius: f32,
    blur: f32,
    side: usize,
    weights: Vec<f32>,
}

impl StampMask {
    pub fn new(radius: f32, blur: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidConfig(format!("stamp radius must be > 0, got {radius}")));
        }
        if !blur.is_finite() || blur < 0.0 {
            return Err(Error::InvalidConfig(format!("stamp blur must be >= 0, got {blur}")));
        }
        let side = (2.0 * (radius + blur)).ceil();
        if side > MAX_RASTER_SIDE as f32 {
            return Err(Error::InvalidConfig(format!("stamp side {side} is too large")));
        }
        let side = side as usize;

        let mut weights = disc_coverage(side, radius);
        if blur > 0.0 {
            // shadow-blur convention: sigma is half the blur width
            gaussian_blur(&mut weights, side, blur * 0.5);
        }

        // Normalize to peak 1.0 (not sum=1); full strength at the center.
        let peak = weights.iter().copied().fold(0.0_f32, f32::max);
        if peak > 0.0 {
            for w in &mut weights {
                *w /= peak;
            }
        }

        tracing::debug!(radius, blur, side, "built stamp mask");
        Ok(Self { radius, blur, side, weights })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn blur(&self) -> f32 {
        self.blur
    }

    /// Width and height of the mask in pixels.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Distance from a point to the mask's top-left corner.
    /// Equals `radius + blur` whenever that is a whole or half pixel.
    pub fn half_size(&self) -> f32 {
        self.side as f32 * 0.5
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn weight(&self, x: usize, y: usize) -> f32 {
        self.weights[y * self.side + x]
    }
}

/// Anti-aliased coverage of a disc of `radius` centered in a `side` x `side` square.
/// Visual: a hard-edged white coin; edge pixels are partly gray instead of jagged.
fn disc_coverage(side: usize, radius: f32) -> Vec<f32> {
    let c = side as f32 * 0.5;            // disc center (pixel corner when side is even)
    let r2 = radius * radius;
    let n = DISC_SUBSAMPLES;
    let step = 1.0 / n as f32;            // spacing between sub-samples
    let per_sample = 1.0 / (n * n) as f32;

    let mut out = vec![0.0_f32; side * side];
    for y in 0..side {
        for x in 0..side {
            let mut hits = 0usize;
            for sy in 0..n {
                for sx in 0..n {
                    let px = x as f32 + (sx as f32 + 0.5) * step - c;
                    let py = y as f32 + (sy as f32 + 0.5) * step - c;
                    if px * px + py * py <= r2 {
                        hits += 1;
                    }
                }
            }
            out[y * side + x] = hits as f32 * per_sample; // fraction of the pixel inside
        }
    }
    out
}

/// In-place separable Gaussian blur. Outside the square counts as empty,
/// so whatever spreads past the edge is cropped away.
/// Visual: the coin's edge turns into a soft falloff about `2 * sigma` wide.
fn gaussian_blur(buf: &mut [f32], side: usize, sigma: f32) {
    // 1) 1D kernel out to 3 sigma, normalized to sum 1 so flat areas keep their value.
    let k = (sigma * 3.0).ceil() as i32;  // kernel half-width
    let denom = 2.0 * sigma * sigma;      // denominator in the exponent
    let mut kernel: Vec<f32> = (-k..=k).map(|i| (-((i * i) as f32) / denom).exp()).collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }

    // 2) Scratch buffer for the row pass (same shape as the mask).
    let n = side as i32;
    let mut tmp = vec![0.0_f32; buf.len()];

    /* ---- Pass 1: Horizontal (buf -> tmp) ----
       Each row is smeared left/right; samples past the edge contribute nothing. */
    for y in 0..n {
        let row = (y * n) as usize;
        for x in 0..n {
            let mut acc = 0.0;
            for (j, w) in kernel.iter().enumerate() {
                let sx = x + j as i32 - k;
                if sx >= 0 && sx < n {
                    acc += buf[row + sx as usize] * w;
                }
            }
            tmp[row + x as usize] = acc;
        }
    }

    /* ---- Pass 2: Vertical (tmp -> buf) ----
       Smearing the row result up/down finishes the 2D blur. */
    for x in 0..n {
        for y in 0..n {
            let mut acc = 0.0;
            for (j, w) in kernel.iter().enumerate() {
                let sy = y + j as i32 - k;
                if sy >= 0 && sy < n {
                    acc += tmp[(sy * n + x) as usize] * w;
                }
            }
            buf[(y * n + x) as usize] = acc;
        }
    }
}
