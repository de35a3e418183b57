// Getting a finished raster out of the crate: as a PNG file, as an
// `image::RgbaImage`, or flattened over a solid background for the preview window.

use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, Raster};

pub fn to_image(raster: &Raster) -> Result<RgbaImage> {
    RgbaImage::from_raw(raster.width(), raster.height(), raster.as_bytes().to_vec()).ok_or(
        Error::SurfaceUnavailable { width: raster.width(), height: raster.height() },
    )
}

/// Write the raster as an RGBA PNG (alpha kept, so it can be reused as a texture).
pub fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    to_image(raster)?.save_with_format(path, ImageFormat::Png)?;
    tracing::info!(path = %path.display(), "wrote heatmap png");
    Ok(())
}

/// Blend the raster over an opaque 0x00RRGGBB background color.
/// Straight alpha: out = src * a + bg * (1 - a).
pub fn composite_over(raster: &Raster, background: u32) -> FrameBuffer {
    let br = (background >> 16) & 0xFF;
    let bg = (background >> 8) & 0xFF;
    let bb = background & 0xFF;

    let pixels = raster
        .as_bytes()
        .chunks_exact(4)
        .map(|p| {
            let a = p[3] as u32;
            let inv = 255 - a;
            // +127 rounds the /255 to nearest
            let mix = |s: u8, d: u32| (s as u32 * a + d * inv + 127) / 255;
            (mix(p[0], br) << 16) | (mix(p[1], bg) << 8) | mix(p[2], bb)
        })
        .collect();

    FrameBuffer {
        width: raster.width() as usize,
        height: raster.height() as usize,
        pixels,
    }
}
