//! Request dispatcher between the UI and the edit session.
//!
//! Each [`UiToEditor`] message is applied to the shared [`EditSession`] and
//! answered with zero or more [`EditorToUi`] messages. Failures never escape:
//! they become [`EditorToUi::Error`] and the session is left unchanged.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use easel_core::codec::{self, CodecError};
use easel_core::viewer::ViewerOutput;
use easel_core::{
    EditError, EditSession, HistogramData, PixelBuffer, PreviewKind, ViewerState, resample_nearest,
};

use crate::config::AppConfig;
use crate::image_loader::{self, LoadError};
use crate::ipc::{EditorToUi, UiToEditor};

/// The session shared between the dispatcher and background jobs.
pub type SharedSession = Arc<Mutex<EditSession>>;

/// Everything a request can fail with.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Cheap to clone; clones share the same session and viewer.
#[derive(Debug, Clone)]
pub struct Editor {
    session: SharedSession,
    viewer: Arc<Mutex<ViewerState>>,
    config: Arc<AppConfig>,
}

impl Editor {
    pub fn new(config: AppConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(EditSession::new())),
            viewer: Arc::new(Mutex::new(ViewerState::default())),
            config: Arc::new(config),
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn viewer(&self) -> ViewerState {
        *self.viewer.lock()
    }

    /// Apply one message and collect the replies.
    pub fn handle(&self, msg: UiToEditor) -> Vec<EditorToUi> {
        debug!(?msg, "editor request");
        self.dispatch(msg).unwrap_or_else(|e| {
            warn!(error = %e, "editor request failed");
            vec![EditorToUi::error(e)]
        })
    }

    fn dispatch(&self, msg: UiToEditor) -> Result<Vec<EditorToUi>, EditorError> {
        let mut session = self.session.lock();
        match msg {
            UiToEditor::RequestState => Ok(vec![state(&session)]),

            UiToEditor::LoadImage { source } => {
                let image = image_loader::load(&source)?;
                let mut replies = vec![EditorToUi::ImageLoaded {
                    width: image.width(),
                    height: image.height(),
                    megapixels: image.megapixels(),
                }];
                // Render before committing so a failure leaves the old image.
                let histogram = HistogramData::compute(&image);
                replies.extend(self.render_buffer(None, &image, histogram)?);
                session.load(image);
                *self.viewer.lock() = ViewerState::default();
                Ok(replies)
            }

            // Filter
            UiToEditor::SetKernel { kernel } => {
                session.set_kernel(kernel);
                Ok(vec![state(&session)])
            }
            UiToEditor::SetKernelPreset { preset } => {
                session.select_preset(preset);
                Ok(vec![state(&session)])
            }
            UiToEditor::SetKernelCell { row, col, value } => {
                session.set_kernel_cell(row, col, value)?;
                Ok(vec![state(&session)])
            }
            UiToEditor::PreviewFilter => {
                session.preview_filter()?;
                self.render(&session)
            }
            UiToEditor::ApplyFilter => {
                session.apply_filter()?;
                self.render(&session)
            }

            // Curves
            UiToEditor::SetCurvePoint {
                handle,
                input,
                output,
            } => {
                session.set_curve_point(handle, input, output)?;
                Ok(vec![state(&session)])
            }
            UiToEditor::PreviewCurve => {
                session.preview_curve()?;
                self.render(&session)
            }
            UiToEditor::ApplyCurve => {
                session.apply_curve()?;
                self.render(&session)
            }
            UiToEditor::ResetCurve => {
                session.reset_curve();
                Ok(vec![state(&session)])
            }

            UiToEditor::CancelPreview => {
                session.cancel_preview();
                self.render(&session)
            }

            UiToEditor::Resize { request } => {
                session.resize(&request)?;
                let mut replies = vec![state(&session)];
                replies.extend(self.render(&session)?);
                Ok(replies)
            }

            UiToEditor::Sample { x, y } => Ok(sample(&mut session, x, y)?),

            UiToEditor::Pointer { event } => {
                let output = {
                    let mut viewer = self.viewer.lock();
                    let (next, output) = viewer.handle(event);
                    *viewer = next;
                    output
                };
                match output {
                    Some(ViewerOutput::ViewChanged { offset, zoom }) => {
                        Ok(vec![EditorToUi::ViewChanged { offset, zoom }])
                    }
                    Some(ViewerOutput::Sample { x, y }) => {
                        // Picks outside the image are ignored.
                        match pixel_in_image(&session, x, y) {
                            Some((x, y)) => Ok(sample(&mut session, x, y)?),
                            None => Ok(Vec::new()),
                        }
                    }
                    Some(ViewerOutput::Hover { x, y }) => match pixel_in_image(&session, x, y) {
                        Some((x, y)) => {
                            let sample = session.inspect(x, y)?;
                            Ok(vec![EditorToUi::PixelInfo {
                                x,
                                y,
                                rgb: sample.rgb,
                            }])
                        }
                        None => Ok(Vec::new()),
                    },
                    None => Ok(Vec::new()),
                }
            }

            UiToEditor::Export { path } => {
                let image = session.require_image()?;
                match path {
                    Some(path) => {
                        let target = self.config.output_path(&path);
                        image_loader::save_png(&target, image)?;
                        Ok(vec![EditorToUi::Exported {
                            path: Some(target.display().to_string()),
                            data_url: None,
                        }])
                    }
                    None => Ok(vec![EditorToUi::Exported {
                        path: None,
                        data_url: Some(codec::encode_data_url(image)?),
                    }]),
                }
            }
        }
    }

    /// Preview image (downscaled per config) and histogram of what is on
    /// screen: the pending preview if any, else the committed image.
    fn render(&self, session: &EditSession) -> Result<Vec<EditorToUi>, EditorError> {
        let (kind, buffer) = match session.preview() {
            Some(preview) => (session.preview_kind(), preview),
            None => (None, session.require_image()?),
        };
        self.render_buffer(kind, buffer, session.display_histogram()?)
    }

    fn render_buffer(
        &self,
        kind: Option<PreviewKind>,
        buffer: &PixelBuffer,
        histogram: HistogramData,
    ) -> Result<Vec<EditorToUi>, EditorError> {
        let scaled: PixelBuffer;
        let shown = match self.config.preview_size(buffer.width(), buffer.height()) {
            Some((w, h)) => {
                scaled = resample_nearest(buffer, w, h)?;
                &scaled
            }
            None => buffer,
        };
        Ok(vec![
            EditorToUi::Preview {
                kind,
                data_url: codec::encode_data_url(shown)?,
                width: shown.width(),
                height: shown.height(),
            },
            EditorToUi::Histogram { histogram },
        ])
    }
}

fn state(session: &EditSession) -> EditorToUi {
    EditorToUi::State {
        snapshot: session.snapshot(),
    }
}

fn sample(session: &mut EditSession, x: u32, y: u32) -> Result<Vec<EditorToUi>, EditError> {
    let sample = session.sample(x, y)?;
    let mut replies = vec![EditorToUi::ColorSampled { sample }];
    if let Some(contrast) = session.samples().contrast() {
        replies.push(EditorToUi::Contrast { contrast });
    }
    Ok(replies)
}

/// View-derived coordinates that land on a pixel of the loaded image.
fn pixel_in_image(session: &EditSession, x: i64, y: i64) -> Option<(u32, u32)> {
    session.image()?.get_signed(x, y).ok()?;
    Some((x as u32, y as u32))
}
