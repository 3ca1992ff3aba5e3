//! Target-size policy applied before resampling.
//!
//! Converts what the user typed (a percentage, or pixel values with an
//! optional aspect-ratio link) into two positive integer dimensions. The
//! resampler itself only ever sees the resolved size.

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::image::check_dimensions;

/// Largest accepted percentage; percentage mode only shrinks.
pub const MAX_PERCENT: f64 = 100.0;

/// How the target size was specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale both sides by `percent / 100`, with `0 < percent <= 100`.
    Percentage { percent: f64 },
    /// Absolute pixel sizes. With a linked aspect ratio either side may be
    /// omitted and is derived from the other.
    Pixels {
        width: Option<f64>,
        height: Option<f64>,
    },
}

/// A resize request as entered in the resize dialog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeRequest {
    #[serde(flatten)]
    pub mode: ResizeMode,
    /// Keep the original aspect ratio.
    #[serde(default = "default_linked")]
    pub link_dimensions: bool,
}

fn default_linked() -> bool {
    true
}

impl ResizeRequest {
    pub fn percentage(percent: f64) -> Self {
        Self {
            mode: ResizeMode::Percentage { percent },
            link_dimensions: true,
        }
    }

    pub fn pixels(width: f64, height: f64, link_dimensions: bool) -> Self {
        Self {
            mode: ResizeMode::Pixels {
                width: Some(width),
                height: Some(height),
            },
            link_dimensions,
        }
    }

    /// Resolve to a concrete `(width, height)` for an `orig_width × orig_height`
    /// image.
    ///
    /// With a linked aspect ratio the larger requested side drives: if
    /// `w > h` then `h = w / ratio`, otherwise `w = h × ratio`, where
    /// `ratio = orig_width / orig_height`. Results are rounded to the nearest
    /// pixel, must be at least 1, and must pass
    /// [`check_dimensions`](crate::image::check_dimensions).
    pub fn resolve(&self, orig_width: u32, orig_height: u32) -> Result<(u32, u32)> {
        if orig_width == 0 || orig_height == 0 {
            return Err(EditError::InvalidDimensions(format!(
                "source {orig_width}x{orig_height} has no area"
            )));
        }
        let ratio = orig_width as f64 / orig_height as f64;

        let (mut w, mut h) = match self.mode {
            ResizeMode::Percentage { percent } => {
                if !percent.is_finite() || percent <= 0.0 || percent > MAX_PERCENT {
                    return Err(EditError::InvalidDimensions(format!(
                        "percentage {percent} must be in (0, {MAX_PERCENT}]"
                    )));
                }
                (
                    orig_width as f64 * percent / 100.0,
                    orig_height as f64 * percent / 100.0,
                )
            }
            ResizeMode::Pixels { width, height } => {
                let width = width.map(positive).transpose()?;
                let height = height.map(positive).transpose()?;
                match (width, height) {
                    (Some(w), Some(h)) => (w, h),
                    (Some(w), None) if self.link_dimensions => (w, w / ratio),
                    (None, Some(h)) if self.link_dimensions => (h * ratio, h),
                    _ => {
                        return Err(EditError::InvalidDimensions(
                            "both width and height are required when the aspect ratio is unlinked"
                                .into(),
                        ));
                    }
                }
            }
        };

        if self.link_dimensions {
            if w > h {
                h = w / ratio;
            } else {
                w = h * ratio;
            }
        }

        let (w, h) = (to_pixels(w)?, to_pixels(h)?);
        check_dimensions(w, h)?;
        Ok((w, h))
    }
}

fn positive(v: f64) -> Result<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(EditError::InvalidDimensions(format!(
            "{v} is not a positive finite size"
        )))
    }
}

fn to_pixels(v: f64) -> Result<u32> {
    let rounded = v.round();
    if !rounded.is_finite() || rounded < 1.0 || rounded > u32::MAX as f64 {
        return Err(EditError::InvalidDimensions(format!(
            "{v} does not round to a usable pixel size"
        )));
    }
    Ok(rounded as u32)
}

/// `width × height / 1e6`.
pub fn megapixels(width: u32, height: u32) -> f64 {
    width as f64 * height as f64 / 1_000_000.0
}
