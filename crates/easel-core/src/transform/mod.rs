//! Geometry: resize policy and nearest-neighbor resampling.

pub mod resample;
pub mod sizing;

pub use resample::resample_nearest;
pub use sizing::{ResizeMode, ResizeRequest, megapixels};
