// Core types shared by the rasterizer, the plane binding and the demo window.

use crate::error::{Error, Result};

/// Largest side a raster may have, in pixels.
pub const MAX_RASTER_SIDE: u32 = 32_767;
/// Largest pixel count a raster may have.
pub const MAX_RASTER_AREA: u64 = 268_435_456;

/// One density sample. `value` is normalized against the heatmap's max intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    pub x: f32,
    pub y: f32,
    pub value: f32,
}

impl WeightedPoint {
    pub fn new(x: f32, y: f32, value: f32) -> Self {
        Self { x, y, value }
    }
}

impl From<(f32, f32, f32)> for WeightedPoint {
    fn from((x, y, value): (f32, f32, f32)) -> Self {
        Self { x, y, value }
    }
}

impl From<[f32; 3]> for WeightedPoint {
    fn from([x, y, value]: [f32; 3]) -> Self {
        Self { x, y, value }
    }
}

/// 8-bit straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// RGBA8 output surface, row-major, 4 bytes per pixel.
/// This is what a host renderer uploads as the plane's texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Allocate a fully transparent raster.
    /// Fails with `SurfaceUnavailable` when the size is over the limits or the
    /// allocation itself fails.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let unavailable = || Error::SurfaceUnavailable { width, height };

        if width > MAX_RASTER_SIDE || height > MAX_RASTER_SIDE {
            return Err(unavailable());
        }
        let area = width as u64 * height as u64;
        if area > MAX_RASTER_AREA {
            return Err(unavailable());
        }
        let len = usize::try_from(area)
            .ok()
            .and_then(|a| a.checked_mul(4))
            .ok_or_else(unavailable)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| unavailable())?;
        data.resize(len, 0);

        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data[i..i + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|p| p[3] == 0)
    }
}

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounding box of the points; an empty set gives an all-zero box.
    pub fn from_points(points: &[WeightedPoint]) -> Self {
        let mut it = points.iter();
        let Some(first) = it.next() else {
            return Self::default();
        };
        let init = Self { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
        it.fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        })
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// 0x00RRGGBB pixels for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}
