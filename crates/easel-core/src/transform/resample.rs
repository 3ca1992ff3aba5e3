//! Nearest-neighbor resampling.
//!
//! Each destination pixel copies the source pixel at
//! `(floor(x / new_w × old_w), floor(y / new_h × old_h))`. No filtering, so
//! downscales alias; that is the only interpolation mode offered.

use tracing::debug;

use crate::error::{EditError, Result};
use crate::image::PixelBuffer;

/// Resize `src` to `new_width × new_height` by nearest-neighbor sampling.
///
/// Targets beyond [`MAX_DIMENSION`](crate::image::MAX_DIMENSION) or
/// [`MAX_PIXELS`](crate::image::MAX_PIXELS) fail before anything is allocated.
pub fn resample_nearest(
    src: &PixelBuffer,
    new_width: u32,
    new_height: u32,
) -> Result<PixelBuffer> {
    if new_width == 0 || new_height == 0 {
        return Err(EditError::InvalidDimensions(format!(
            "target {new_width}x{new_height} must be positive"
        )));
    }
    if src.is_empty() {
        return Err(EditError::InvalidDimensions(format!(
            "cannot resample an empty {}x{} source",
            src.width(),
            src.height()
        )));
    }

    let (old_width, old_height) = src.dimensions();
    debug!(old_width, old_height, new_width, new_height, "nearest-neighbor resample");

    let mut out = PixelBuffer::try_new(new_width, new_height)?;

    // Integer form of floor(x / new × old): exact, no float drift at edges.
    let columns: Vec<usize> = (0..new_width as u64)
        .map(|x| (x * old_width as u64 / new_width as u64) as usize)
        .collect();

    let dst = out.pixels_mut();
    for y in 0..new_height as u64 {
        let src_y = (y * old_height as u64 / new_height as u64) as u32;
        let row = src.row(src_y);
        let start = y as usize * new_width as usize;
        for (d, &sx) in dst[start..start + new_width as usize].iter_mut().zip(&columns) {
            *d = row[sx];
        }
    }
    Ok(out)
}
