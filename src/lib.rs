//! Software heat-map rasterizer.
//!
//! Weighted 2D points are stamped as soft circles into an opacity plane,
//! the opacity is colorized through a 256-entry gradient table, and the
//! resulting RGBA buffer is ready to be uploaded as a texture.
//!
//! ```no_run
//! use heatmap_plane::{Heatmap, WeightedPoint};
//!
//! let mut heatmap = Heatmap::new(256, 256)?;
//! heatmap.set_points([WeightedPoint::new(10.0, 10.0, 100.0)]);
//! let raster = heatmap.draw(None)?;
//! assert_eq!(raster.width(), 256);
//! # Ok::<(), heatmap_plane::Error>(())
//! ```

pub mod color;
pub mod config;
pub mod demo;
pub mod error;
pub mod export;
pub mod gradient;
pub mod heatmap;
pub mod plane;
pub mod stamp;
pub mod types;
pub mod window;

pub use config::HeatmapConfig;
pub use error::{Error, Result};
pub use gradient::{Gradient, GradientStop, GradientTable};
pub use heatmap::Heatmap;
pub use plane::{HeatmapPlane, PlaneTexture};
pub use stamp::StampMask;
pub use types::{Bounds, FrameBuffer, Raster, Rgba, WeightedPoint};
