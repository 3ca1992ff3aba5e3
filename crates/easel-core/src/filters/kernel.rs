//! Square convolution kernels and the named presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};

/// Tolerance for treating a kernel's weight sum as 1.
const NORMALIZED_TOLERANCE: f64 = 1e-9;

/// A square matrix of weights with odd side length.
///
/// Construction validates shape and weights, so every `Kernel` in existence
/// has a well-defined center cell and is safe to convolve with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Kernel {
    size: usize,
    /// Row-major weights, `size * size` long.
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel from rows of weights.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(EditError::InvalidKernel("kernel is empty".into()));
        }
        if size % 2 == 0 {
            return Err(EditError::InvalidKernel(format!(
                "side length must be odd, got {size}"
            )));
        }
        let mut weights = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(EditError::InvalidKernel(format!(
                    "row {i} has {} weights, expected {size}",
                    row.len()
                )));
            }
            weights.extend(row);
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
            return Err(EditError::InvalidKernel(format!("non-finite weight {bad}")));
        }
        Ok(Self { size, weights })
    }

    /// Parse `"a,b,c;d,e,f;g,h,i"` (rows separated by `;`).
    pub fn parse(text: &str) -> Result<Self> {
        let rows = text
            .split(';')
            .map(|row| {
                row.split(',')
                    .map(|cell| {
                        let cell = cell.trim();
                        cell.parse::<f64>().map_err(|_| {
                            EditError::InvalidKernel(format!("'{cell}' is not a number"))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
    }

    /// The 1×1 or larger identity: center 1, everything else 0.
    pub fn identity(size: usize) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(EditError::InvalidKernel(format!(
                "side length must be odd and positive, got {size}"
            )));
        }
        let mut weights = vec![0.0; size * size];
        weights[size * size / 2] = 1.0;
        Ok(Self { size, weights })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the center cell to the edge: `floor(size / 2)`.
    pub fn half(&self) -> usize {
        self.size / 2
    }

    /// Weight at `(row, col)`. Panics if out of range.
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.size + col]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.weights.chunks(self.size).map(<[f64]>::to_vec).collect()
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// True if the weights sum to 1, i.e. the kernel preserves brightness.
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < NORMALIZED_TOLERANCE
    }

    /// Copy of this kernel with one cell replaced.
    pub fn with_weight(&self, row: usize, col: usize, value: f64) -> Result<Self> {
        if row >= self.size || col >= self.size {
            return Err(EditError::InvalidKernel(format!(
                "cell ({row}, {col}) is outside a {0}x{0} kernel",
                self.size
            )));
        }
        if !value.is_finite() {
            return Err(EditError::InvalidKernel(format!("non-finite weight {value}")));
        }
        let mut next = self.clone();
        next.weights[row * self.size + col] = value;
        Ok(next)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        KernelPreset::Identity.kernel()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Kernel {
    type Error = EditError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<Kernel> for Vec<Vec<f64>> {
    fn from(kernel: Kernel) -> Self {
        kernel.rows()
    }
}

/// Built-in 3×3 kernels selectable instead of hand-editing weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelPreset {
    Identity,
    /// Center 5, four-neighbors −1.
    Sharpen,
    /// 1-2-1 binomial blur over 16.
    GaussianBlur,
    /// Uniform 1/9 average.
    BoxBlur,
}

impl KernelPreset {
    pub const ALL: [KernelPreset; 4] = [
        KernelPreset::Identity,
        KernelPreset::Sharpen,
        KernelPreset::GaussianBlur,
        KernelPreset::BoxBlur,
    ];

    /// Stable identifier used on the command line and in messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Sharpen => "sharpen",
            Self::GaussianBlur => "gaussian-blur",
            Self::BoxBlur => "box-blur",
        }
    }

    pub fn kernel(self) -> Kernel {
        let weights = match self {
            Self::Identity => vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            Self::Sharpen => vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
            Self::GaussianBlur => [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0]
                .map(|w| w / 16.0)
                .to_vec(),
            Self::BoxBlur => vec![1.0 / 9.0; 9],
        };
        Kernel { size: 3, weights }
    }
}

impl fmt::Display for KernelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelPreset {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "identity" => Ok(Self::Identity),
            "sharpen" => Ok(Self::Sharpen),
            "gaussian-blur" | "gaussian" | "gaussianblur" => Ok(Self::GaussianBlur),
            "box-blur" | "box" | "boxblur" => Ok(Self::BoxBlur),
            _ => Err(EditError::InvalidKernel(format!("unknown preset '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_even_and_empty_kernels() {
        assert!(matches!(Kernel::new(vec![]), Err(EditError::InvalidKernel(_))));
        assert!(Kernel::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).is_err());
        assert!(Kernel::identity(0).is_err());
        assert!(Kernel::identity(4).is_err());
    }

    #[test]
    fn test_rejects_ragged_and_non_finite() {
        let ragged = vec![vec![0.0; 3], vec![0.0; 2], vec![0.0; 3]];
        assert!(Kernel::new(ragged).is_err());
        let nan = vec![vec![0.0, 0.0, 0.0], vec![0.0, f64::NAN, 0.0], vec![0.0; 3]];
        assert!(Kernel::new(nan).is_err());
    }

    #[test]
    fn test_presets_are_normalized() {
        for preset in KernelPreset::ALL {
            let k = preset.kernel();
            assert_eq!(k.size(), 3);
            assert!(k.is_normalized(), "{preset} sums to {}", k.sum());
        }
    }

    #[test]
    fn test_identity_preset_matches_constructor() {
        assert_eq!(KernelPreset::Identity.kernel(), Kernel::identity(3).unwrap());
        assert_eq!(Kernel::default(), Kernel::identity(3).unwrap());
        assert_eq!(Kernel::identity(1).unwrap().weights(), &[1.0]);
    }

    #[test]
    fn test_sharpen_weights() {
        let k = KernelPreset::Sharpen.kernel();
        assert_eq!(k.weight(1, 1), 5.0);
        assert_eq!(k.weight(0, 1), -1.0);
        assert_eq!(k.weight(0, 0), 0.0);
    }

    #[test]
    fn test_parse_text_grid() {
        let k = Kernel::parse("0,-1,0; -1,5,-1; 0,-1,0").unwrap();
        assert_eq!(k, KernelPreset::Sharpen.kernel());
        assert!(Kernel::parse("1,2;3,4").is_err());
        assert!(Kernel::parse("1,x,0;0,1,0;0,0,1").is_err());
    }

    #[test]
    fn test_with_weight_returns_new_kernel() {
        let k = Kernel::identity(3).unwrap();
        let edited = k.with_weight(0, 2, 0.5).unwrap();
        assert_eq!(edited.weight(0, 2), 0.5);
        assert_eq!(k.weight(0, 2), 0.0);
        assert!(k.with_weight(3, 0, 1.0).is_err());
        assert!(k.with_weight(0, 0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_preset_names_roundtrip() {
        for preset in KernelPreset::ALL {
            assert_eq!(preset.name().parse::<KernelPreset>().unwrap(), preset);
        }
        assert_eq!("gaussianBlur".parse::<KernelPreset>().unwrap(), KernelPreset::GaussianBlur);
        assert!("emboss".parse::<KernelPreset>().is_err());
    }

    #[test]
    fn test_serde_rejects_even_kernel() {
        let ok: Kernel = serde_json::from_str("[[1.0]]").unwrap();
        assert_eq!(ok.size(), 1);
        assert!(serde_json::from_str::<Kernel>("[[1,0],[0,1]]").is_err());
    }
}
