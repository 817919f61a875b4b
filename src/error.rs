use thiserror::Error;

/// Library error type for composition and export operations.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// A template identifier outside the closed set was supplied.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    /// The source image has a zero width or height.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    /// The canvas to lay out into is empty or not finite.
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidCanvasDimensions { width: f64, height: f64 },

    /// Export scale must be a positive, finite multiplier.
    #[error("invalid export scale {0}")]
    InvalidExportScale(f64),

    /// The target raster could not be allocated.
    #[error("render surface {width}x{height} unavailable: {reason}")]
    RenderSurfaceUnavailable {
        width: u64,
        height: u64,
        reason: String,
    },

    /// The render worker panicked or was torn down before finishing.
    #[error("render failed: {0}")]
    RenderFailed(String),
}

pub type Result<T, E = CompositionError> = std::result::Result<T, E>;
