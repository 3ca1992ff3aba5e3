//! Two-point tone curve and 8-bit lookup-table baking.
//!
//! The curve is piecewise linear with flat extrapolation:
//!
//! ```text
//! i <= p1.in            → p1.out
//! i >= p2.in            → p2.out
//! otherwise             → round(p1.out + (i − p1.in) / (p2.in − p1.in)
//!                                  × (p2.out − p1.out))
//! ```
//!
//! `p1.in < p2.in` is enforced on every edit, so the interpolation span is
//! never zero or negative.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EditError, Result};
use crate::image::PixelBuffer;

/// Number of entries in an 8-bit lookup table.
pub const LUT_SIZE: usize = 256;

/// One curve handle: maps an input level to an output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveControlPoint {
    pub input: u8,
    pub output: u8,
}

impl CurveControlPoint {
    pub const fn new(input: u8, output: u8) -> Self {
        Self { input, output }
    }

    /// Build from raw integers, rejecting values outside `0..=255`.
    pub fn from_ints(input: i64, output: i64) -> Result<Self> {
        Ok(Self {
            input: level(input, "input")?,
            output: level(output, "output")?,
        })
    }
}

fn level(v: i64, what: &str) -> Result<u8> {
    u8::try_from(v).map_err(|_| {
        EditError::InvalidControlPoints(format!("{what} {v} is outside 0..=255"))
    })
}

/// Which of the two handles an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveHandle {
    Point1,
    Point2,
}

/// A 256-entry table mapping input channel value to output channel value.
#[derive(Clone, PartialEq, Eq)]
pub struct LookupTable([u8; LUT_SIZE]);

impl LookupTable {
    pub fn get(&self, input: u8) -> u8 {
        self.0[input as usize]
    }

    /// Apply to R, G, B of every pixel; alpha is untouched.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        let mut out = src.clone();
        for px in out.pixels_mut() {
            px[0] = self.0[px[0] as usize];
            px[1] = self.0[px[1] as usize];
            px[2] = self.0[px[2] as usize];
        }
        out
    }
}

impl std::fmt::Debug for LookupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LookupTable").field(&&self.0[..]).finish()
    }
}

/// Two-handle tone curve. Defaults to the identity `(0,0)–(255,255)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawToneCurve")]
pub struct ToneCurve {
    point1: CurveControlPoint,
    point2: CurveControlPoint,
}

#[derive(Deserialize)]
struct RawToneCurve {
    point1: CurveControlPoint,
    point2: CurveControlPoint,
}

impl TryFrom<RawToneCurve> for ToneCurve {
    type Error = EditError;

    fn try_from(raw: RawToneCurve) -> Result<Self> {
        Self::new(raw.point1, raw.point2)
    }
}

impl Default for ToneCurve {
    fn default() -> Self {
        Self {
            point1: CurveControlPoint::new(0, 0),
            point2: CurveControlPoint::new(255, 255),
        }
    }
}

impl ToneCurve {
    pub fn new(point1: CurveControlPoint, point2: CurveControlPoint) -> Result<Self> {
        check_order(point1, point2)?;
        Ok(Self { point1, point2 })
    }

    pub fn point1(&self) -> CurveControlPoint {
        self.point1
    }

    pub fn point2(&self) -> CurveControlPoint {
        self.point2
    }

    pub fn point(&self, handle: CurveHandle) -> CurveControlPoint {
        match handle {
            CurveHandle::Point1 => self.point1,
            CurveHandle::Point2 => self.point2,
        }
    }

    /// Move `point1`. Rejected, leaving the curve unchanged, if it would not
    /// stay strictly left of `point2`.
    pub fn set_point1(&mut self, point: CurveControlPoint) -> Result<()> {
        self.set_points(point, self.point2)
    }

    /// Move `point2`. Rejected, leaving the curve unchanged, if it would not
    /// stay strictly right of `point1`.
    pub fn set_point2(&mut self, point: CurveControlPoint) -> Result<()> {
        self.set_points(self.point1, point)
    }

    pub fn set_point(&mut self, handle: CurveHandle, point: CurveControlPoint) -> Result<()> {
        match handle {
            CurveHandle::Point1 => self.set_point1(point),
            CurveHandle::Point2 => self.set_point2(point),
        }
    }

    /// Edit boundary for raw UI integers: range and ordering are both checked.
    pub fn set_point_from_ints(
        &mut self,
        handle: CurveHandle,
        input: i64,
        output: i64,
    ) -> Result<()> {
        self.set_point(handle, CurveControlPoint::from_ints(input, output)?)
    }

    pub fn set_points(
        &mut self,
        point1: CurveControlPoint,
        point2: CurveControlPoint,
    ) -> Result<()> {
        check_order(point1, point2)?;
        self.point1 = point1;
        self.point2 = point2;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Only the default handles bake to the identity table: any other
    /// `point1` moves level 0 or `point1.input`, and likewise for `point2`.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Output level for a single input level.
    pub fn evaluate(&self, input: u8) -> u8 {
        let (p1, p2) = (self.point1, self.point2);
        if input <= p1.input {
            return p1.output;
        }
        if input >= p2.input {
            return p2.output;
        }
        let ratio = (input - p1.input) as f64 / (p2.input - p1.input) as f64;
        let out = p1.output as f64 + ratio * (p2.output as f64 - p1.output as f64);
        out.round() as u8
    }

    /// Bake the curve into a 256-entry table.
    pub fn lookup_table(&self) -> LookupTable {
        let mut table = [0u8; LUT_SIZE];
        for (i, v) in table.iter_mut().enumerate() {
            *v = self.evaluate(i as u8);
        }
        LookupTable(table)
    }

    /// Apply the curve to a buffer, returning a new one.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        if self.is_identity() {
            trace!("identity tone curve; copying");
            return src.clone();
        }
        debug!(
            width = src.width(),
            height = src.height(),
            p1 = ?self.point1,
            p2 = ?self.point2,
            "applying tone curve"
        );
        self.lookup_table().apply(src)
    }

    /// Vertices of the curve as drawn on a 0..255 chart, flat ends included.
    pub fn polyline(&self) -> [(u8, u8); 4] {
        [
            (0, self.point1.output),
            (self.point1.input, self.point1.output),
            (self.point2.input, self.point2.output),
            (255, self.point2.output),
        ]
    }
}

fn check_order(point1: CurveControlPoint, point2: CurveControlPoint) -> Result<()> {
    if point1.input >= point2.input {
        return Err(EditError::InvalidControlPoints(format!(
            "point1.input ({}) must be less than point2.input ({})",
            point1.input, point2.input
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(p1: (u8, u8), p2: (u8, u8)) -> ToneCurve {
        ToneCurve::new(
            CurveControlPoint::new(p1.0, p1.1),
            CurveControlPoint::new(p2.0, p2.1),
        )
        .unwrap()
    }

    #[test]
    fn test_default_is_identity_lut() {
        let lut = ToneCurve::default().lookup_table();
        for i in 0..=255u8 {
            assert_eq!(lut.get(i), i);
        }
        assert!(ToneCurve::default().is_identity());
    }

    #[test]
    fn test_is_identity_matches_baked_table() {
        let identity_lut = ToneCurve::default().lookup_table();
        for (p1, p2) in [((0, 0), (254, 254)), ((1, 1), (255, 255)), ((0, 1), (255, 255))] {
            let c = curve(p1, p2);
            assert!(!c.is_identity());
            assert_ne!(c.lookup_table(), identity_lut);
        }
        let src = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 7, 9]);
        assert_eq!(ToneCurve::default().apply(&src), src);
    }

    #[test]
    fn test_control_points_are_exact() {
        for (p1, p2) in [
            ((10, 200), (20, 3)),
            ((0, 77), (1, 78)),
            ((100, 0), (254, 255)),
            ((3, 250), (251, 5)),
        ] {
            let c = curve(p1, p2);
            let lut = c.lookup_table();
            assert_eq!(lut.get(p1.0), p1.1);
            assert_eq!(lut.get(p2.0), p2.1);
        }
    }

    #[test]
    fn test_flat_extrapolation_outside_span() {
        let lut = curve((50, 20), (200, 240)).lookup_table();
        for i in 0..=50u8 {
            assert_eq!(lut.get(i), 20);
        }
        for i in 200..=255u8 {
            assert_eq!(lut.get(i), 240);
        }
    }

    #[test]
    fn test_linear_interpolation_rounds() {
        // Halfway between (0, 0) and (10, 5) on input 5 → 2.5 → 3.
        let c = curve((0, 0), (10, 5));
        assert_eq!(c.evaluate(5), 3);
        assert_eq!(c.evaluate(2), 1);
        // Inverting curve.
        let inv = curve((0, 255), (255, 0));
        assert_eq!(inv.evaluate(100), 155);
    }

    #[test]
    fn test_invalid_edits_are_rejected_and_state_kept() {
        let mut c = curve((10, 10), (100, 100));
        let before = c;
        assert!(matches!(
            c.set_point1(CurveControlPoint::new(100, 0)),
            Err(EditError::InvalidControlPoints(_))
        ));
        assert!(c.set_point2(CurveControlPoint::new(5, 0)).is_err());
        assert_eq!(c, before);

        assert!(c.set_point_from_ints(CurveHandle::Point1, -1, 0).is_err());
        assert!(c.set_point_from_ints(CurveHandle::Point2, 200, 256).is_err());
        assert_eq!(c, before);

        c.set_point_from_ints(CurveHandle::Point2, 200, 30).unwrap();
        assert_eq!(c.point2(), CurveControlPoint::new(200, 30));
    }

    #[test]
    fn test_new_rejects_equal_inputs() {
        let p = CurveControlPoint::new(40, 40);
        assert!(ToneCurve::new(p, p).is_err());
    }

    #[test]
    fn test_apply_maps_rgb_and_keeps_alpha() {
        let src = PixelBuffer::from_fn(4, 1, |x, _| [(x * 60) as u8, 255, 0, (x * 10) as u8]);
        let c = curve((0, 255), (255, 0));
        let out = c.apply(&src);
        for x in 0..4 {
            let a = src.get(x, 0).unwrap();
            let b = out.get(x, 0).unwrap();
            assert_eq!(b, [255 - a[0], 0, 255, a[3]]);
        }
        // Input untouched.
        assert_eq!(src.get(1, 0).unwrap(), [60, 255, 0, 10]);
    }

    #[test]
    fn test_polyline_vertices() {
        let c = curve((30, 40), (220, 210));
        assert_eq!(c.polyline(), [(0, 40), (30, 40), (220, 210), (255, 210)]);
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut c = curve((30, 40), (220, 210));
        c.reset();
        assert_eq!(c, ToneCurve::default());
    }

    #[test]
    fn test_deserialize_validates_order() {
        let ok: ToneCurve = serde_json::from_str(
            r#"{"point1":{"input":1,"output":2},"point2":{"input":3,"output":4}}"#,
        )
        .unwrap();
        assert_eq!(ok.point2().input, 3);
        let bad = serde_json::from_str::<ToneCurve>(
            r#"{"point1":{"input":9,"output":2},"point2":{"input":3,"output":4}}"#,
        );
        assert!(bad.is_err());
    }
}
