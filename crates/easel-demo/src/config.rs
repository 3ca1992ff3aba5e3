//! Application configuration for the demo.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Default longest edge of preview images sent to the UI.
const DEFAULT_PREVIEW_MAX_EDGE: u32 = 1024;
/// Default directory for relative export paths.
const DEFAULT_OUTPUT_DIR: &str = ".";
/// Default `tracing` filter when neither `RUST_LOG` nor `EASEL_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration for the Easel demo application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    /// Previews larger than this on either side are downscaled before
    /// encoding. `0` disables downscaling.
    pub preview_max_edge: u32,
    /// Base directory for relative export paths.
    pub output_dir: PathBuf,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preview_max_edge: std::env::var("EASEL_PREVIEW_MAX_EDGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PREVIEW_MAX_EDGE),
            output_dir: std::env::var_os("EASEL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            log_filter: std::env::var("EASEL_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned()),
        }
    }
}

impl AppConfig {
    /// Resolve an export path against [`output_dir`](Self::output_dir).
    pub fn output_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }

    /// Target size for a preview of `width × height`, keeping the aspect
    /// ratio. `None` when no downscale is needed.
    pub fn preview_size(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let edge = self.preview_max_edge;
        let longest = width.max(height);
        if edge == 0 || longest <= edge {
            return None;
        }
        let scale = edge as f64 / longest as f64;
        let w = ((width as f64 * scale).round() as u32).max(1);
        let h = ((height as f64 * scale).round() as u32).max(1);
        Some((w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(edge: u32) -> AppConfig {
        AppConfig {
            preview_max_edge: edge,
            output_dir: PathBuf::from("/tmp/out"),
            log_filter: "info".into(),
        }
    }

    #[test]
    fn test_preview_size_keeps_aspect() {
        let c = config(100);
        assert_eq!(c.preview_size(400, 200), Some((100, 50)));
        assert_eq!(c.preview_size(30, 1000), Some((3, 100)));
        assert_eq!(c.preview_size(100, 80), None);
    }

    #[test]
    fn test_zero_edge_disables_downscale() {
        assert_eq!(config(0).preview_size(10_000, 10_000), None);
    }

    #[test]
    fn test_relative_output_paths_join_output_dir() {
        let c = config(0);
        assert_eq!(c.output_path("a.png"), PathBuf::from("/tmp/out/a.png"));
        assert_eq!(c.output_path("/abs/b.png"), PathBuf::from("/abs/b.png"));
    }
}
