//! IPC message contracts between the editor backend and the UI.
//!
//! These enums define the complete set of messages exchanged between the UI
//! and the editor. Both use `#[serde(tag = "type", content = "data")]`, so a
//! message on the wire looks like `{"type":"Sample","data":{"x":3,"y":4}}`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use easel_core::grading::curves::CurveHandle;
use easel_core::{
    ColorSample, Contrast, HistogramData, Kernel, KernelPreset, PreviewKind, ResizeRequest,
    SessionSnapshot, ViewerEvent,
};

/// Messages from the UI to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEditor {
    /// Request a fresh snapshot of editor state.
    RequestState,

    /// Load a new source image from a file path or a `data:` URL.
    LoadImage {
        /// File path or data URL.
        source: String,
    },

    /// Replace the whole kernel.
    SetKernel {
        /// The new kernel.
        kernel: Kernel,
    },

    /// Load one of the built-in kernels.
    SetKernelPreset {
        /// Preset name.
        preset: KernelPreset,
    },

    /// Edit a single kernel weight.
    SetKernelCell { row: usize, col: usize, value: f64 },

    /// Render the current kernel into the preview buffer.
    PreviewFilter,

    /// Convolve the current image with the current kernel.
    ApplyFilter,

    /// Move one curve handle. Values are checked against `[0, 255]` and
    /// handle ordering; rejected edits leave the curve unchanged.
    SetCurvePoint {
        handle: CurveHandle,
        input: i64,
        output: i64,
    },

    /// Render the current curve into the preview buffer.
    PreviewCurve,

    /// Apply the current curve to the image.
    ApplyCurve,

    /// Restore the identity curve.
    ResetCurve,

    /// Resize the current image.
    Resize {
        /// Target size as entered in the resize dialog.
        request: ResizeRequest,
    },

    /// Sample the pixel at image coordinates.
    Sample { x: u32, y: u32 },

    /// Raw pointer or key input over the viewer.
    Pointer {
        /// The input event in view coordinates.
        event: ViewerEvent,
    },

    /// Discard the pending preview.
    CancelPreview,

    /// Export the current image as PNG.
    Export {
        /// Destination file; relative paths resolve against the output
        /// directory. `None` returns a data URL instead.
        path: Option<String>,
    },
}

/// Messages from the editor to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorToUi {
    /// A new image was loaded successfully.
    ImageLoaded {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// `width × height / 1e6`.
        megapixels: f64,
    },

    /// Full editor state.
    State {
        /// Session summary.
        snapshot: SessionSnapshot,
    },

    /// The image (or pending preview) to display, as a PNG data URL.
    Preview {
        /// Which adjustment is being previewed; `None` for the committed image.
        kind: Option<PreviewKind>,
        /// PNG data URL, possibly downscaled.
        data_url: String,
        /// Width of the encoded image.
        width: u32,
        /// Height of the encoded image.
        height: u32,
    },

    /// Per-channel histogram of what is on screen.
    Histogram {
        /// Histogram of the preview, or the image if none.
        histogram: HistogramData,
    },

    /// The pixel under the cursor. Sent on hover; does not fill a sample slot.
    PixelInfo { x: u32, y: u32, rgb: [u8; 3] },

    /// The eyedropper picked a color.
    ColorSampled {
        /// Picked color with XYZ and Lab.
        sample: ColorSample,
    },

    /// Contrast between the two picked colors.
    Contrast {
        /// Ratio and WCAG AA classification.
        contrast: Contrast,
    },

    /// The viewer offset or zoom changed.
    ViewChanged { offset: Vec2, zoom: f32 },

    /// The image was exported.
    Exported {
        /// Path written, when exporting to disk.
        path: Option<String>,
        /// Data URL, when exporting in-memory.
        data_url: Option<String>,
    },

    /// An error occurred in the editor.
    Error {
        /// Error description.
        message: String,
    },
}

impl EditorToUi {
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::viewer::PointerButton;

    #[test]
    fn test_messages_use_type_and_data_tags() {
        let json = serde_json::to_value(UiToEditor::Sample { x: 3, y: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Sample", "data": {"x": 3, "y": 4}}));

        let json = serde_json::to_value(UiToEditor::PreviewFilter).unwrap();
        assert_eq!(json, serde_json::json!({"type": "PreviewFilter"}));
    }

    #[test]
    fn test_ui_messages_parse() {
        let msg: UiToEditor = serde_json::from_str(
            r#"{"type":"SetCurvePoint","data":{"handle":"point1","input":20,"output":0}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            UiToEditor::SetCurvePoint {
                handle: CurveHandle::Point1,
                input: 20,
                output: 0
            }
        );

        let msg: UiToEditor = serde_json::from_str(
            r#"{"type":"SetKernelPreset","data":{"preset":"box-blur"}}"#,
        )
        .unwrap();
        assert_eq!(msg, UiToEditor::SetKernelPreset { preset: KernelPreset::BoxBlur });

        let msg: UiToEditor = serde_json::from_str(
            r#"{"type":"Resize","data":{"request":{"mode":"percentage","percent":50}}}"#,
        )
        .unwrap();
        assert_eq!(msg, UiToEditor::Resize { request: ResizeRequest::percentage(50.0) });
    }

    #[test]
    fn test_pointer_roundtrip() {
        let msg = UiToEditor::Pointer {
            event: ViewerEvent::Press {
                button: PointerButton::Middle,
                position: Vec2::new(1.5, 2.0),
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(serde_json::from_str::<UiToEditor>(&json).unwrap(), msg);
    }

    #[test]
    fn test_pixel_info_shape() {
        let json = serde_json::to_value(EditorToUi::PixelInfo {
            x: 1,
            y: 2,
            rgb: [10, 20, 30],
        })
        .unwrap();
        let expected = serde_json::json!({
            "type": "PixelInfo",
            "data": {"x": 1, "y": 2, "rgb": [10, 20, 30]}
        });
        assert_eq!(json, expected);
    }

    #[test]
    fn test_error_message() {
        let json = serde_json::to_value(EditorToUi::error("no image loaded")).unwrap();
        assert_eq!(json["type"], "Error");
        assert_eq!(json["data"]["message"], "no image loaded");
    }
}
