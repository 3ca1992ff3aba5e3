//! Easel Core: pixel-level editing engine.
//!
//! Decoding and encoding, kernel convolution, two-point tone curves,
//! nearest-neighbor resizing, colorimetry (sRGB / XYZ / Lab, WCAG contrast),
//! histograms, and the edit session that ties them together. No UI or
//! framework dependencies.

pub mod codec;
pub mod color_management;
pub mod error;
pub mod filters;
pub mod grading;
pub mod image;
pub mod scopes;
pub mod session;
pub mod transform;
pub mod viewer;

// Re-exports for convenience.
pub use color_management::{ColorSample, Contrast, ParsedColor, SamplePair};
pub use error::{EditError, Result};
pub use filters::{Kernel, KernelPreset, convolve};
pub use grading::curves::{CurveControlPoint, CurveHandle, LookupTable, ToneCurve};
pub use image::PixelBuffer;
pub use scopes::{Channel, HistogramData};
pub use session::{EditSession, PipelineRequest, PreviewKind, SessionSnapshot};
pub use transform::{ResizeMode, ResizeRequest, resample_nearest};
pub use viewer::{ViewerEvent, ViewerOutput, ViewerState};
