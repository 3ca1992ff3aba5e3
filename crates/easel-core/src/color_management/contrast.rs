//! Relative luminance and WCAG contrast ratio.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::transfer::channel_to_linear;

/// Rec. 709 luminance weights.
const LUMA_REC709: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Minimum ratio for WCAG 2.x AA body text.
pub const WCAG_AA_MIN_RATIO: f64 = 4.5;

/// Relative luminance of an 8-bit sRGB color, in `0..=1`.
pub fn relative_luminance(rgb: [u8; 3]) -> f64 {
    let linear = rgb.map(channel_to_linear);
    LUMA_REC709[0] * linear[0] + LUMA_REC709[1] * linear[1] + LUMA_REC709[2] * linear[2]
}

/// Contrast ratio between two colors: `(L_max + 0.05) / (L_min + 0.05)`.
///
/// Always in `1.0..=21.0` and symmetric in its arguments.
pub fn contrast_ratio(a: [u8; 3], b: [u8; 3]) -> f64 {
    ratio_from_luminance(relative_luminance(a), relative_luminance(b))
}

fn ratio_from_luminance(l1: f64, l2: f64) -> f64 {
    let brightest = l1.max(l2);
    let darkest = l1.min(l2);
    (brightest + 0.05) / (darkest + 0.05)
}

/// WCAG AA classification of a contrast ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContrastLevel {
    /// Ratio of at least 4.5:1.
    Sufficient,
    Insufficient,
}

impl ContrastLevel {
    pub fn classify(ratio: f64) -> Self {
        if ratio >= WCAG_AA_MIN_RATIO {
            Self::Sufficient
        } else {
            Self::Insufficient
        }
    }

    pub fn is_sufficient(self) -> bool {
        self == Self::Sufficient
    }
}

/// Contrast between two colors together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contrast {
    pub ratio: f64,
    pub level: ContrastLevel,
}

impl Contrast {
    pub fn between(a: [u8; 3], b: [u8; 3]) -> Self {
        Self::from_ratio(contrast_ratio(a, b))
    }

    fn from_ratio(ratio: f64) -> Self {
        Self {
            ratio,
            level: ContrastLevel::classify(ratio),
        }
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}:1", self.ratio)?;
        if !self.level.is_sufficient() {
            write!(f, " (insufficient contrast)")?;
        }
        Ok(())
    }
}

/// Result of parsing a textual color such as `rgb(12, 34, 56)`.
///
/// Unparsable input is kept as an explicit state instead of an error. Its
/// luminance is 0, so contrast against it behaves as contrast against black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedColor {
    Rgb([u8; 3]),
    Unparsable,
}

impl ParsedColor {
    /// Take the first three runs of ASCII digits as R, G, B.
    ///
    /// Accepts `rgb(1, 2, 3)`, `rgba(1,2,3,0.5)`, or bare `1 2 3`. Fewer
    /// than three numbers, or a number above 255, is unparsable.
    pub fn parse(s: &str) -> Self {
        let mut channels = [0u8; 3];
        let mut found = 0;
        for run in s.split(|c: char| !c.is_ascii_digit()).filter(|r| !r.is_empty()) {
            if found == 3 {
                break;
            }
            match run.parse::<u8>() {
                Ok(v) => channels[found] = v,
                Err(_) => return Self::Unparsable,
            }
            found += 1;
        }
        if found == 3 {
            Self::Rgb(channels)
        } else {
            Self::Unparsable
        }
    }

    pub fn rgb(self) -> Option<[u8; 3]> {
        match self {
            Self::Rgb(rgb) => Some(rgb),
            Self::Unparsable => None,
        }
    }

    /// Relative luminance, or 0 for unparsable input.
    pub fn luminance(self) -> f64 {
        self.rgb().map_or(0.0, relative_luminance)
    }
}

impl FromStr for ParsedColor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Contrast between two textual colors, with the unparsable fallback.
pub fn contrast_ratio_css(a: &str, b: &str) -> Contrast {
    let l1 = ParsedColor::parse(a).luminance();
    let l2 = ParsedColor::parse(b).luminance();
    Contrast::from_ratio(ratio_from_luminance(l1, l2))
}

/// Format as the CSS functional notation `rgb(r, g, b)`.
pub fn css_rgb(rgb: [u8; 3]) -> String {
    format!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;
    const WHITE: [u8; 3] = [255, 255, 255];
    const BLACK: [u8; 3] = [0, 0, 0];

    #[test]
    fn test_white_on_black_is_21() {
        assert!((contrast_ratio(WHITE, BLACK) - 21.0).abs() < EPSILON);
        assert!((contrast_ratio(BLACK, WHITE) - 21.0).abs() < EPSILON);
    }

    #[test]
    fn test_same_color_is_one() {
        assert!((contrast_ratio([90, 10, 200], [90, 10, 200]) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(relative_luminance(BLACK).abs() < EPSILON);
        assert!((relative_luminance(WHITE) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_classification_threshold() {
        assert_eq!(ContrastLevel::classify(4.5), ContrastLevel::Sufficient);
        assert_eq!(ContrastLevel::classify(4.49), ContrastLevel::Insufficient);
        // #767676 on white is the classic just-passing gray.
        assert!(Contrast::between([0x76, 0x76, 0x76], WHITE).level.is_sufficient());
        assert!(!Contrast::between([0x77, 0x77, 0x77], WHITE).level.is_sufficient());
    }

    #[test]
    fn test_parse_css_forms() {
        assert_eq!(ParsedColor::parse("rgb(12, 34, 56)"), ParsedColor::Rgb([12, 34, 56]));
        assert_eq!(ParsedColor::parse("rgba(1,2,3,0.5)"), ParsedColor::Rgb([1, 2, 3]));
        assert_eq!(ParsedColor::parse("7 8 9"), ParsedColor::Rgb([7, 8, 9]));
        assert_eq!(ParsedColor::parse(""), ParsedColor::Unparsable);
        assert_eq!(ParsedColor::parse("rgb(1, 2)"), ParsedColor::Unparsable);
        assert_eq!(ParsedColor::parse("rgb(300, 2, 3)"), ParsedColor::Unparsable);
        assert_eq!(ParsedColor::parse("N/A"), ParsedColor::Unparsable);
    }

    #[test]
    fn test_unparsable_falls_back_to_zero_luminance() {
        assert_eq!(ParsedColor::Unparsable.luminance(), 0.0);
        let c = contrast_ratio_css("garbage", "rgb(255, 255, 255)");
        assert!((c.ratio - 21.0).abs() < EPSILON);
    }

    #[test]
    fn test_css_formatting() {
        assert_eq!(css_rgb([1, 22, 255]), "rgb(1, 22, 255)");
        let parsed: ParsedColor = css_rgb([1, 22, 255]).parse().unwrap();
        assert_eq!(parsed.rgb(), Some([1, 22, 255]));
    }

    #[test]
    fn test_display_flags_insufficient() {
        let low = Contrast::between([120, 120, 120], [140, 140, 140]);
        assert!(low.to_string().ends_with("(insufficient contrast)"));
        assert_eq!(Contrast::between(WHITE, BLACK).to_string(), "21.00:1");
    }
}
