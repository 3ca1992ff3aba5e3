//! Eyedropper samples: a pixel's color in sRGB, XYZ, and Lab.

use serde::{Deserialize, Serialize};

use super::color_space::{rgb_to_xyz, xyz_to_lab};
use super::contrast::{Contrast, css_rgb};
use crate::error::Result;
use crate::image::PixelBuffer;

/// A color picked from an image, with its position and derived coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    pub rgb: [u8; 3],
    pub position: (u32, u32),
    pub xyz: [f64; 3],
    pub lab: [f64; 3],
}

impl ColorSample {
    /// Sample the pixel at `(x, y)`. Alpha is ignored.
    pub fn at(buffer: &PixelBuffer, x: u32, y: u32) -> Result<Self> {
        let [r, g, b, _] = buffer.get(x, y)?;
        Ok(Self::from_rgb([r, g, b], (x, y)))
    }

    pub fn from_rgb(rgb: [u8; 3], position: (u32, u32)) -> Self {
        let xyz = rgb_to_xyz(rgb);
        Self {
            rgb,
            position,
            xyz,
            lab: xyz_to_lab(xyz),
        }
    }

    /// `rgb(r, g, b)` text, as shown next to the swatch.
    pub fn css(&self) -> String {
        css_rgb(self.rgb)
    }

    /// XYZ rounded to two decimals for display.
    pub fn xyz_rounded(&self) -> [f64; 3] {
        self.xyz.map(round2)
    }

    /// Lab rounded to two decimals for display.
    pub fn lab_rounded(&self) -> [f64; 3] {
        self.lab.map(round2)
    }

    pub fn contrast_with(&self, other: &ColorSample) -> Contrast {
        Contrast::between(self.rgb, other.rgb)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// The two eyedropper slots used for contrast comparison.
///
/// The first slot fills before the second; once both are set, a new sample
/// replaces the second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplePair {
    pub color1: Option<ColorSample>,
    pub color2: Option<ColorSample>,
}

impl SamplePair {
    pub fn push(&mut self, sample: ColorSample) {
        if self.color1.is_none() {
            self.color1 = Some(sample);
        } else {
            self.color2 = Some(sample);
        }
    }

    /// Contrast between the two slots, when both are set.
    pub fn contrast(&self) -> Option<Contrast> {
        match (&self.color1, &self.color2) {
            (Some(a), Some(b)) => Some(a.contrast_with(b)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;

    #[test]
    fn test_sample_reads_pixel_and_converts() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(1, 1, [255, 255, 255, 10]).unwrap();
        let s = ColorSample::at(&buf, 1, 1).unwrap();
        assert_eq!(s.rgb, [255, 255, 255]);
        assert_eq!(s.position, (1, 1));
        assert!((s.xyz[1] - 100.0).abs() < 1e-9);
        assert_eq!(s.lab_rounded(), [100.0, 0.0, 0.0]);
        assert_eq!(s.css(), "rgb(255, 255, 255)");
    }

    #[test]
    fn test_sample_out_of_bounds() {
        let buf = PixelBuffer::new(2, 2);
        assert!(matches!(ColorSample::at(&buf, 2, 0), Err(EditError::OutOfBounds { .. })));
    }

    #[test]
    fn test_pair_fills_then_replaces_second() {
        let white = ColorSample::from_rgb([255, 255, 255], (0, 0));
        let black = ColorSample::from_rgb([0, 0, 0], (1, 0));
        let gray = ColorSample::from_rgb([128, 128, 128], (2, 0));

        let mut pair = SamplePair::default();
        pair.push(white);
        assert!(pair.contrast().is_none());
        pair.push(black);
        assert!((pair.contrast().unwrap().ratio - 21.0).abs() < 1e-9);
        pair.push(gray);
        assert_eq!(pair.color1, Some(white));
        assert_eq!(pair.color2, Some(gray));

        pair.clear();
        assert!(pair.color1.is_none());
    }
}
