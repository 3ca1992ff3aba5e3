//! Image representation for the editing pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EditError, Result};

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Longest side accepted for a buffer built from user-supplied sizes.
pub const MAX_DIMENSION: u32 = 1 << 16;

/// Largest pixel count accepted for a buffer built from user-supplied sizes
/// (1 GiB of RGBA).
pub const MAX_PIXELS: u64 = 1 << 28;

/// Reject sizes a user could request but the editor should never allocate.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EditError::InvalidDimensions(format!(
            "{width}x{height} exceeds the {MAX_DIMENSION} pixel side limit"
        )));
    }
    if width as u64 * height as u64 > MAX_PIXELS {
        return Err(EditError::InvalidDimensions(format!(
            "{width}x{height} exceeds the {MAX_PIXELS} pixel limit"
        )));
    }
    Ok(())
}

/// Fixed-size RGBA8 raster, row-major, channel order R, G, B, A.
///
/// `data.len() == width * height * 4` holds for the whole lifetime of the
/// buffer. Dimensions never change in place; resizing produces a new buffer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPixelBuffer")]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[derive(Deserialize)]
struct RawPixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TryFrom<RawPixelBuffer> for PixelBuffer {
    type Error = EditError;

    fn try_from(raw: RawPixelBuffer) -> Result<Self> {
        Self::from_raw(raw.width, raw.height, raw.data)
    }
}

impl PixelBuffer {
    /// Transparent black buffer of the given size.
    ///
    /// For sizes derived from user input use [`try_new`](Self::try_new),
    /// which fails instead of aborting on an impossible allocation.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; saturating_byte_len(width, height)],
        }
    }

    /// Transparent black buffer, bounded by [`check_dimensions`].
    pub fn try_new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        let len = saturating_byte_len(width, height);
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            EditError::InvalidDimensions(format!("cannot allocate {width}x{height}: {e}"))
        })?;
        data.resize(len, 0);
        Ok(Self { width, height, data })
    }

    /// Buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(saturating_byte_len(width, height));
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&rgba);
        }
        Self { width, height, data }
    }

    /// Wrap raw RGBA bytes. Fails if the length does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let Some(expected) = byte_len(width, height) else {
            return Err(EditError::InvalidDimensions(format!(
                "{width}x{height} RGBA does not fit in memory"
            )));
        };
        if data.len() != expected {
            return Err(EditError::InvalidDimensions(format!(
                "{width}x{height} RGBA needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(saturating_byte_len(width, height));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Size in megapixels, for display.
    pub fn megapixels(&self) -> f64 {
        crate::transform::sizing::megapixels(self.width, self.height)
    }

    /// Read the RGBA tuple at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        Ok(px)
    }

    /// Overwrite the RGBA tuple at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<()> {
        let offset = self.offset(x, y)?;
        self.data[offset..offset + CHANNELS].copy_from_slice(&rgba);
        Ok(())
    }

    /// Signed-coordinate lookup for callers mapping from view space, where
    /// negative positions are possible.
    pub fn get_signed(&self, x: i64, y: i64) -> Result<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Err(self.out_of_bounds(x, y));
        }
        self.get(x as u32, y as u32)
    }

    /// Pixels as `[R, G, B, A]` tuples without copying.
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// One row of pixels. Caller guarantees `y < height`.
    pub(crate) fn row(&self, y: u32) -> &[[u8; 4]] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels()[start..start + w]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x as i64, y as i64));
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    fn out_of_bounds(&self, x: i64, y: i64) -> EditError {
        EditError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// Overflow maps to `usize::MAX`, which the allocator then refuses.
fn saturating_byte_len(width: u32, height: u32) -> usize {
    byte_len(width, height).unwrap_or(usize::MAX)
}
