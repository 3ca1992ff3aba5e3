//! Editing session: the one document the orchestrator works on.
//!
//! `EditSession` owns the current image together with the kernel, tone
//! curve, and eyedropper samples the user has set up. Every operation is
//! invoked explicitly on the session; nothing is global.
//!
//! Previews render into a scratch buffer that is discarded on cancel and
//! promoted to the current image on apply. Operations that fail leave the
//! session exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::color_management::{ColorSample, Contrast, SamplePair};
use crate::error::{EditError, Result};
use crate::filters::{Kernel, KernelPreset, convolve};
use crate::grading::curves::{CurveHandle, ToneCurve};
use crate::image::PixelBuffer;
use crate::scopes::HistogramData;
use crate::transform::{ResizeRequest, resample_nearest};

/// Which adjustment produced the pending preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Filter,
    Curve,
}

#[derive(Debug, Clone)]
struct Preview {
    kind: PreviewKind,
    buffer: PixelBuffer,
}

/// A batch of adjustments applied in the fixed order filter → curve → resize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub filter: Option<Kernel>,
    pub curve: Option<ToneCurve>,
    pub resize: Option<ResizeRequest>,
}

/// Serializable summary of the session for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub dimensions: Option<(u32, u32)>,
    pub megapixels: Option<f64>,
    pub kernel: Kernel,
    pub curve: ToneCurve,
    /// Chart vertices of `curve`, flat ends included.
    pub curve_polyline: [(u8, u8); 4],
    pub samples: SamplePair,
    pub contrast: Option<Contrast>,
    pub preview: Option<PreviewKind>,
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    image: Option<PixelBuffer>,
    kernel: Kernel,
    curve: ToneCurve,
    samples: SamplePair,
    preview: Option<Preview>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(image: PixelBuffer) -> Self {
        let mut session = Self::new();
        session.load(image);
        session
    }

    /// Replace the current image. Previews and samples refer to the old
    /// pixels and are dropped; kernel and curve settings are kept.
    pub fn load(&mut self, image: PixelBuffer) {
        info!(width = image.width(), height = image.height(), "image loaded");
        self.image = Some(image);
        self.preview = None;
        self.samples.clear();
    }

    pub fn image(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    pub fn require_image(&self) -> Result<&PixelBuffer> {
        self.image.as_ref().ok_or(EditError::NoImage)
    }

    /// Take the current image out of the session.
    pub fn take_image(&mut self) -> Option<PixelBuffer> {
        self.preview = None;
        self.image.take()
    }

    // ── Filter ──────────────────────────────────────────────────────────

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn set_kernel(&mut self, kernel: Kernel) {
        self.kernel = kernel;
    }

    pub fn select_preset(&mut self, preset: KernelPreset) {
        debug!(%preset, "kernel preset selected");
        self.kernel = preset.kernel();
    }

    /// Edit one kernel cell. Rejected edits keep the previous kernel.
    pub fn set_kernel_cell(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let next = self.kernel.with_weight(row, col, value).inspect_err(|e| {
            warn!("kernel edit rejected: {e}");
        })?;
        self.kernel = next;
        Ok(())
    }

    /// Render the current kernel into the preview scratch buffer.
    pub fn preview_filter(&mut self) -> Result<&PixelBuffer> {
        let rendered = convolve(self.require_image()?, &self.kernel);
        Ok(self.store_preview(PreviewKind::Filter, rendered))
    }

    /// Convolve the current image with the current kernel and keep the result.
    pub fn apply_filter(&mut self) -> Result<()> {
        let result = convolve(self.require_image()?, &self.kernel);
        self.commit(result);
        Ok(())
    }

    // ── Curve ───────────────────────────────────────────────────────────

    pub fn curve(&self) -> &ToneCurve {
        &self.curve
    }

    pub fn set_curve(&mut self, curve: ToneCurve) {
        self.curve = curve;
    }

    /// Move one curve handle. Out-of-range or mis-ordered edits are rejected
    /// and the previous curve is retained.
    pub fn set_curve_point(&mut self, handle: CurveHandle, input: i64, output: i64) -> Result<()> {
        self.curve
            .set_point_from_ints(handle, input, output)
            .inspect_err(|e| warn!("curve edit rejected: {e}"))
    }

    pub fn reset_curve(&mut self) {
        self.curve.reset();
    }

    pub fn preview_curve(&mut self) -> Result<&PixelBuffer> {
        let rendered = self.curve.apply(self.require_image()?);
        Ok(self.store_preview(PreviewKind::Curve, rendered))
    }

    pub fn apply_curve(&mut self) -> Result<()> {
        let result = self.curve.apply(self.require_image()?);
        self.commit(result);
        Ok(())
    }

    // ── Preview ─────────────────────────────────────────────────────────

    pub fn preview(&self) -> Option<&PixelBuffer> {
        self.preview.as_ref().map(|p| &p.buffer)
    }

    pub fn preview_kind(&self) -> Option<PreviewKind> {
        self.preview.as_ref().map(|p| p.kind)
    }

    /// Discard the preview. The current image is untouched.
    pub fn cancel_preview(&mut self) {
        self.preview = None;
    }

    fn store_preview(&mut self, kind: PreviewKind, buffer: PixelBuffer) -> &PixelBuffer {
        &self.preview.insert(Preview { kind, buffer }).buffer
    }

    fn commit(&mut self, image: PixelBuffer) {
        self.image = Some(image);
        self.preview = None;
    }

    // ── Geometry ────────────────────────────────────────────────────────

    /// Resolve `request` against the current size and resample.
    /// Returns the new dimensions.
    pub fn resize(&mut self, request: &ResizeRequest) -> Result<(u32, u32)> {
        let image = self.require_image()?;
        let (w, h) = request.resolve(image.width(), image.height())?;
        let resized = resample_nearest(image, w, h)?;
        info!(
            from = ?image.dimensions(),
            to = ?(w, h),
            "image resized"
        );
        self.commit(resized);
        // Sample positions no longer address the same pixels.
        self.samples.clear();
        Ok((w, h))
    }

    /// Apply a batch in the fixed order filter → curve → resize. The session
    /// is only updated if every step succeeds.
    pub fn process(&mut self, request: &PipelineRequest) -> Result<()> {
        let mut image = self.require_image()?.clone();
        if let Some(kernel) = &request.filter {
            image = convolve(&image, kernel);
        }
        if let Some(curve) = &request.curve {
            image = curve.apply(&image);
        }
        let resized = match &request.resize {
            Some(resize) => {
                let (w, h) = resize.resolve(image.width(), image.height())?;
                image = resample_nearest(&image, w, h)?;
                true
            }
            None => false,
        };
        self.commit(image);
        if resized {
            self.samples.clear();
        }
        Ok(())
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// Histogram of the current image.
    pub fn histogram(&self) -> Result<HistogramData> {
        Ok(HistogramData::compute(self.require_image()?))
    }

    /// Histogram of the preview if one exists, else of the current image.
    pub fn display_histogram(&self) -> Result<HistogramData> {
        match self.preview() {
            Some(preview) => Ok(HistogramData::compute(preview)),
            None => self.histogram(),
        }
    }

    /// Read a pixel without recording it.
    pub fn inspect(&self, x: u32, y: u32) -> Result<ColorSample> {
        ColorSample::at(self.require_image()?, x, y)
    }

    /// Eyedropper pick: sample and store in the next free slot.
    pub fn sample(&mut self, x: u32, y: u32) -> Result<ColorSample> {
        let sample = self.inspect(x, y)?;
        self.samples.push(sample);
        Ok(sample)
    }

    pub fn samples(&self) -> &SamplePair {
        &self.samples
    }

    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            dimensions: self.image.as_ref().map(PixelBuffer::dimensions),
            megapixels: self.image.as_ref().map(PixelBuffer::megapixels),
            kernel: self.kernel.clone(),
            curve: self.curve,
            curve_polyline: self.curve.polyline(),
            samples: self.samples,
            contrast: self.samples.contrast(),
            preview: self.preview_kind(),
        }
    }
}
