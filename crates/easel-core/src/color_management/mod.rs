//! Color science: sRGB transfer, XYZ/Lab conversion, luminance, and contrast.

pub mod color_space;
pub mod contrast;
pub mod sample;
pub mod transfer;

pub use color_space::{lab_to_rgb, rgb_to_lab, rgb_to_xyz, xyz_to_lab, xyz_to_rgb};
pub use contrast::{
    Contrast, ContrastLevel, ParsedColor, contrast_ratio, contrast_ratio_css, relative_luminance,
};
pub use sample::{ColorSample, SamplePair};
