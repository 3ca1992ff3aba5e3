//! Background execution of editor requests.
//!
//! Convolution and encoding on a large image can take a while, so requests
//! run on tokio's blocking pool. The result comes back through a single
//! oneshot handoff; there is no progress reporting or cancellation.

use tokio::sync::oneshot;

use crate::editor::Editor;
use crate::ipc::{EditorToUi, UiToEditor};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("background job ended without a result")]
    Dropped,
}

/// Run `job` on the blocking pool and wait for its result.
pub async fn run_blocking<T, F>(job: F) -> Result<T, WorkerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        // The receiver may have gone away; nothing to do then.
        let _ = tx.send(job());
    });
    rx.await.map_err(|_| WorkerError::Dropped)
}

/// Handle one message off the async executor.
pub async fn submit(editor: &Editor, msg: UiToEditor) -> Result<Vec<EditorToUi>, WorkerError> {
    let editor = editor.clone();
    run_blocking(move || editor.handle(msg)).await
}

#[cfg(test)]
mod tests {
    use easel_core::PixelBuffer;
    use easel_core::codec;

    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        assert_eq!(run_blocking(|| 6 * 7).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_panicking_job_reports_dropped() {
        let result = run_blocking(|| -> u8 { panic!("boom") }).await;
        assert!(matches!(result, Err(WorkerError::Dropped)));
    }

    #[tokio::test]
    async fn test_submit_shares_session() {
        let editor = Editor::new(AppConfig {
            preview_max_edge: 0,
            output_dir: ".".into(),
            log_filter: "info".into(),
        });
        let source = codec::encode_data_url(&PixelBuffer::filled(2, 2, [5, 5, 5, 255])).unwrap();
        let replies = submit(&editor, UiToEditor::LoadImage { source }).await.unwrap();
        assert!(matches!(replies[0], EditorToUi::ImageLoaded { width: 2, height: 2, .. }));
        assert_eq!(editor.session().lock().image().map(PixelBuffer::dimensions), Some((2, 2)));
    }
}
