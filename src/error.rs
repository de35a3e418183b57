// One error type for the whole crate.
// Every variant states *where* things went wrong.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The raster could not be allocated at the requested size.
    #[error("drawing surface unavailable: {width}x{height}")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// A setter (or a config file) was given a value the rasterizer cannot use.
    #[error("invalid heatmap config: {0}")]
    InvalidConfig(String),

    /// A gradient color string could not be parsed.
    #[error("invalid color: {0}")]
    Color(String),

    /// Reading or parsing a TOML config file failed.
    #[error("config error: {0}")]
    Config(String),

    /// Encoding or writing the PNG failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Creating or updating the preview window failed.
    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, Error>;
