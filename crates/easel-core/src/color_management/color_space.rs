//! sRGB ↔ CIE XYZ ↔ CIE Lab conversions.
//!
//! XYZ is scaled so that Y of sRGB white is 100. Lab is normalized against
//! the XYZ of RGB (255, 255, 255) computed from the same matrix, so white maps
//! to exactly L = 100, a = b = 0.

use glam::{DMat3, DVec3};

use super::transfer::{channel_to_linear, linear_to_channel};

/// A 3x3 color matrix for linear color space conversions.
#[derive(Debug, Clone, Copy)]
pub struct ColorMatrix(pub DMat3);

impl ColorMatrix {
    /// Linear sRGB (D65) to XYZ, rows as published in IEC 61966-2-1.
    pub fn srgb_to_xyz() -> Self {
        Self(DMat3::from_cols_array_2d(&[
            [0.4124, 0.3576, 0.1805],
            [0.2126, 0.7152, 0.0722],
            [0.0193, 0.1192, 0.9505],
        ])
        // `from_cols_array_2d` reads columns; the table above is row-major.
        .transpose())
    }

    /// XYZ to linear sRGB.
    pub fn xyz_to_srgb() -> Self {
        Self(Self::srgb_to_xyz().0.inverse())
    }

    /// Apply this matrix to a triplet.
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        (self.0 * DVec3::from_array(v)).to_array()
    }
}

/// Lab `f(t)` breakpoint, (6/29)³ rounded as in the classic formulation.
const LAB_EPSILON: f64 = 0.008856;
/// Slope of the linear segment of `f(t)`.
const LAB_KAPPA: f64 = 7.787;
const LAB_OFFSET: f64 = 16.0 / 116.0;

/// Convert 8-bit sRGB to XYZ (Y of white = 100).
pub fn rgb_to_xyz(rgb: [u8; 3]) -> [f64; 3] {
    let linear = rgb.map(channel_to_linear);
    ColorMatrix::srgb_to_xyz().apply(linear).map(|c| c * 100.0)
}

/// Convert XYZ back to 8-bit sRGB, rounding and clamping out-of-gamut values.
pub fn xyz_to_rgb(xyz: [f64; 3]) -> [u8; 3] {
    let linear = ColorMatrix::xyz_to_srgb().apply(xyz.map(|c| c / 100.0));
    linear.map(linear_to_channel)
}

/// XYZ of RGB (255, 255, 255): the reference white for Lab.
pub fn white_point() -> [f64; 3] {
    rgb_to_xyz([255, 255, 255])
}

/// Convert XYZ to CIE L*a*b* relative to [`white_point`].
pub fn xyz_to_lab(xyz: [f64; 3]) -> [f64; 3] {
    let white = white_point();
    let fx = lab_f(xyz[0] / white[0]);
    let fy = lab_f(xyz[1] / white[1]);
    let fz = lab_f(xyz[2] / white[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert CIE L*a*b* back to XYZ relative to [`white_point`].
pub fn lab_to_xyz(lab: [f64; 3]) -> [f64; 3] {
    let white = white_point();
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = fy + lab[1] / 500.0;
    let fz = fy - lab[2] / 200.0;
    [
        white[0] * lab_f_inv(fx),
        white[1] * lab_f_inv(fy),
        white[2] * lab_f_inv(fz),
    ]
}

pub fn rgb_to_lab(rgb: [u8; 3]) -> [f64; 3] {
    xyz_to_lab(rgb_to_xyz(rgb))
}

pub fn lab_to_rgb(lab: [f64; 3]) -> [u8; 3] {
    xyz_to_rgb(lab_to_xyz(lab))
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + LAB_OFFSET
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cubed = f * f * f;
    if cubed > LAB_EPSILON {
        cubed
    } else {
        (f - LAB_OFFSET) / LAB_KAPPA
    }
}
