//! Error taxonomy shared by every editing operation.

/// Errors reported by the pixel-processing engine.
///
/// All variants are local and recoverable: the caller decides whether to
/// surface them to the user or discard the attempted edit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// A pixel coordinate fell outside the buffer extent.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    /// Kernel is empty, even-sized, non-square, or holds non-finite weights.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Curve edit would break `point1.input < point2.input` or leave `0..=255`.
    #[error("invalid curve control points: {0}")]
    InvalidControlPoints(String),

    /// Non-positive or non-finite target dimensions, or a raw buffer whose
    /// length does not match its dimensions.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// The session has no image loaded yet.
    #[error("no image loaded")]
    NoImage,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = EditError> = std::result::Result<T, E>;
