//! Image intake for backgrounds and uploaded stickers.
//!
//! Decoding happens before any document mutation, so a file that fails to
//! decode leaves the editor untouched. Formats outside PNG, JPEG, GIF and
//! WebP are re-encoded to PNG, since renderers only embed those four.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use image::GenericImageView;

use crate::document::{ImageFormat, ImageHandle, ImageId};
use crate::error::{EditorError, EditorResult};

/// Decode raster bytes into a background image handle.
///
/// # Errors
///
/// Returns [`EditorError::ImageDecode`] if the format is unknown, the data is
/// corrupt, or the image has a zero dimension.
pub fn decode_image(bytes: &[u8]) -> EditorResult<ImageHandle> {
    let guessed = image::guess_format(bytes).map_err(decode_failed)?;
    let decoded = image::load_from_memory_with_format(bytes, guessed).map_err(decode_failed)?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(decode_failed("image has zero width or height"));
    }

    let (format, bytes) = match map_format(guessed) {
        Some(format) => (format, bytes.to_vec()),
        None => (ImageFormat::Png, reencode_png(&decoded, guessed)?),
    };
    let handle = ImageHandle {
        id: ImageId::new(),
        width,
        height,
        format,
        bytes: Arc::new(bytes),
    };
    tracing::debug!(id = %handle.id, width, height, ?format, "Decoded image");
    Ok(handle)
}

/// Encode an uploaded sticker file as a data URL usable as a sticker `src`.
///
/// SVG documents and PNG, JPEG, GIF or WebP files are embedded as-is. Other
/// raster formats are decoded and re-encoded to PNG.
///
/// # Errors
///
/// Returns [`EditorError::ImageDecode`] if the bytes are neither SVG nor a
/// decodable raster image.
pub fn sticker_source(bytes: &[u8]) -> EditorResult<String> {
    if looks_like_svg(bytes) {
        return Ok(data_url(ImageFormat::Svg, bytes));
    }
    let guessed = image::guess_format(bytes).map_err(decode_failed)?;
    if let Some(format) = map_format(guessed) {
        return Ok(data_url(format, bytes));
    }
    let decoded = image::load_from_memory_with_format(bytes, guessed).map_err(decode_failed)?;
    Ok(data_url(ImageFormat::Png, &reencode_png(&decoded, guessed)?))
}

/// Build a `data:` URL for `bytes`.
#[must_use]
pub fn data_url(format: ImageFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

impl ImageHandle {
    /// The image as a `data:` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        data_url(self.format, &self.bytes)
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

const fn map_format(format: image::ImageFormat) -> Option<ImageFormat> {
    match format {
        image::ImageFormat::Png => Some(ImageFormat::Png),
        image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
        image::ImageFormat::Gif => Some(ImageFormat::Gif),
        image::ImageFormat::WebP => Some(ImageFormat::WebP),
        _ => None,
    }
}

fn reencode_png(
    decoded: &image::DynamicImage,
    source: image::ImageFormat,
) -> EditorResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    decoded
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(decode_failed)?;
    tracing::debug!(?source, "Re-encoded image to PNG");
    Ok(out.into_inner())
}

fn decode_failed(reason: impl std::fmt::Display) -> EditorError {
    tracing::warn!("Image decode failed: {reason}");
    EditorError::ImageDecode(reason.to_string())
}
