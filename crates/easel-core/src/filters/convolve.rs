//! Spatial-domain 2D convolution with edge-replication padding.
//!
//! # Algorithm
//! 1. Pad the source by `half = floor(size / 2)` on every side, repeating the
//!    nearest edge pixel (no zero padding, so borders do not darken).
//! 2. For each output pixel, sum `padded[y + i][x + j] × kernel[i][j]` over
//!    the kernel window for R, G, B independently.
//! 3. Round and saturate each sum to `0..=255`. Alpha is copied from the
//!    source pixel.
//!
//! # Complexity
//! O(width × height × size²). No separable or FFT shortcut.

use tracing::debug;

use super::kernel::Kernel;
use crate::image::PixelBuffer;

/// Convolve `src` with `kernel`, returning a new buffer of the same size.
///
/// The kernel is validated on construction, so this never fails. An empty
/// source yields an empty result.
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let (width, height) = src.dimensions();
    if src.is_empty() {
        return src.clone();
    }
    debug!(width, height, kernel_size = kernel.size(), "convolving");

    let half = kernel.half();
    let size = kernel.size();
    let padded = pad_edges(src, half);
    let padded_width = width as usize + 2 * half;
    let weights = kernel.weights();
    let source = src.pixels();

    let mut out = PixelBuffer::new(width, height);
    let dst = out.pixels_mut();

    for y in 0..height as usize {
        for x in 0..width as usize {
            let mut acc = [0.0_f64; 3];
            for i in 0..size {
                let row = (y + i) * padded_width + x;
                let taps = &padded[row..row + size];
                let krow = &weights[i * size..(i + 1) * size];
                for (px, &w) in taps.iter().zip(krow) {
                    acc[0] += px[0] as f64 * w;
                    acc[1] += px[1] as f64 * w;
                    acc[2] += px[2] as f64 * w;
                }
            }
            let idx = y * width as usize + x;
            dst[idx] = [
                saturate(acc[0]),
                saturate(acc[1]),
                saturate(acc[2]),
                source[idx][3],
            ];
        }
    }

    out
}

/// Build a `(w + 2·pad) × (h + 2·pad)` copy of `src` with edges replicated.
fn pad_edges(src: &PixelBuffer, pad: usize) -> Vec<[u8; 4]> {
    let (width, height) = (src.width() as usize, src.height() as usize);
    let padded_width = width + 2 * pad;
    let padded_height = height + 2 * pad;
    let mut padded = Vec::with_capacity(padded_width * padded_height);

    for py in 0..padded_height {
        let sy = py.saturating_sub(pad).min(height - 1);
        let row = src.row(sy as u32);
        for px in 0..padded_width {
            let sx = px.saturating_sub(pad).min(width - 1);
            padded.push(row[sx]);
        }
    }

    padded
}

/// Round to nearest and clamp to the 8-bit range.
fn saturate(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
