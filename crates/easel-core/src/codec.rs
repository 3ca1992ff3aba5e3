//! Byte-stream boundary: decode uploads into a [`PixelBuffer`] and encode
//! results as lossless PNG.
//!
//! Format sniffing and decoding are delegated to the `image` crate. Only RGBA8
//! PNG is produced on the way out.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::EditError;
use crate::image::PixelBuffer;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Errors raised at the codec boundary.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("malformed data URL: {0}")]
    DataUrl(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Buffer(#[from] EditError),
}

/// Decode any format the `image` crate recognizes into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
    let img = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(width, height, "decoded image");
    Ok(PixelBuffer::from_raw(width, height, rgba.into_raw())?)
}

/// Encode as an RGBA8 PNG.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(CodecError::Encode)?;
    Ok(bytes)
}

/// Encode as a `data:image/png;base64,…` URL.
pub fn encode_data_url(buffer: &PixelBuffer) -> Result<String, CodecError> {
    let png = encode_png(buffer)?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)))
}

/// Decode a base64 `data:` URL of any image type.
pub fn decode_data_url(url: &str) -> Result<PixelBuffer, CodecError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CodecError::DataUrl("missing 'data:' scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CodecError::DataUrl("missing ',' separator".into()))?;
    if !meta.ends_with(";base64") {
        return Err(CodecError::DataUrl("only base64 payloads are supported".into()));
    }
    let bytes = STANDARD.decode(payload.trim())?;
    decode(&bytes)
}
