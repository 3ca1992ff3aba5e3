//! Convolution filters: kernels, presets, and the edge-padded convolution pass.

pub mod convolve;
pub mod kernel;

pub use convolve::convolve;
pub use kernel::{Kernel, KernelPreset};
