//! Image loading and saving by path for the demo application.

use std::path::{Path, PathBuf};

use easel_core::PixelBuffer;
use easel_core::codec::{self, CodecError};

/// Load an image from disk, or from a `data:` URL if `source` is one.
///
/// Any format the `image` crate recognizes is accepted and converted to
/// RGBA8.
pub fn load(source: &str) -> Result<PixelBuffer, LoadError> {
    if source.starts_with("data:") {
        return Ok(codec::decode_data_url(source)?);
    }
    load_path(Path::new(source))
}

/// Load an image file from disk.
pub fn load_path(path: &Path) -> Result<PixelBuffer, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = codec::decode(&bytes)?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "image loaded"
    );
    Ok(image)
}

/// Save as PNG, whatever the extension says.
pub fn save_png(path: &Path, image: &PixelBuffer) -> Result<(), LoadError> {
    let bytes = codec::encode_png(image)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "image saved");
    Ok(())
}

/// Errors that can occur during image loading or saving.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}
