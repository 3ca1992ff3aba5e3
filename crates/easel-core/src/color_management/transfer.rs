//! sRGB transfer function (IEC 61966-2-1).
//!
//! Converts between gamma-encoded sRGB channel values and linear light.
//!
//! ```text
//! to_linear:   V <= 0.04045 → V / 12.92
//!              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
//!
//! to_encoded:  L <= 0.0031308 → L × 12.92
//!              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
//! ```
//!
//! One threshold (0.04045) is used for every caller, including relative
//! luminance. WCAG 2.x quotes 0.03928 there; no 8-bit code value lies between
//! the two thresholds (10/255 ≈ 0.0392, 11/255 ≈ 0.0431), so results for
//! `u8` channels are identical either way.

/// Encoded-domain breakpoint of the piecewise curve.
pub const SRGB_THRESHOLD: f64 = 0.04045;

/// Linear-domain breakpoint of the inverse curve.
const LINEAR_THRESHOLD: f64 = 0.003_130_8;

/// Decode a normalized sRGB value (0..1) to linear light.
pub fn srgb_to_linear(v: f64) -> f64 {
    if v <= SRGB_THRESHOLD {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode linear light (0..1) to a normalized sRGB value.
pub fn linear_to_srgb(l: f64) -> f64 {
    if l <= LINEAR_THRESHOLD {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode an 8-bit channel to linear light.
pub fn channel_to_linear(c: u8) -> f64 {
    srgb_to_linear(c as f64 / 255.0)
}

/// Encode linear light to an 8-bit channel, rounding and saturating.
pub fn linear_to_channel(l: f64) -> u8 {
    (linear_to_srgb(l.clamp(0.0, 1.0)) * 255.0).round() as u8
}
