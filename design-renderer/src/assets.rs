//! Image source loading for the compositor.
//!
//! Every image layer source is normalized to a `data:` URI so the SVG
//! intermediate is self-contained. Remote URLs are refused: export never
//! performs network fetches, and the compositor paints a placeholder for
//! sources it cannot load.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{RenderError, RenderResult};

/// An image source resolved to an embeddable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Self-contained `data:` URI for embedding in SVG.
    pub data_uri: String,
    /// Pixel width of the decoded image.
    pub width: u32,
    /// Pixel height of the decoded image.
    pub height: u32,
}

/// Resolve an image layer source to an embeddable image.
///
/// `data:` URIs are validated and passed through. Plain paths are read from
/// the filesystem, decoded, and re-encoded as PNG data URIs. `http(s)`
/// URLs are rejected.
///
/// # Errors
///
/// Returns [`RenderError::AssetLoad`] for remote URLs, unreadable files,
/// and undecodable image data.
pub fn load_image_source(src: &str) -> RenderResult<LoadedImage> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(RenderError::AssetLoad(format!(
            "remote assets are not fetched during export: {src}"
        )));
    }

    if let Some(rest) = src.strip_prefix("data:") {
        let payload = rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| {
                RenderError::AssetLoad("data URI is not base64-encoded".to_string())
            })?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| RenderError::AssetLoad(format!("invalid base64 payload: {e}")))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| RenderError::AssetLoad(format!("undecodable data URI: {e}")))?;
        return Ok(LoadedImage {
            data_uri: src.to_string(),
            width: decoded.width(),
            height: decoded.height(),
        });
    }

    let bytes = std::fs::read(src)
        .map_err(|e| RenderError::AssetLoad(format!("cannot read {src}: {e}")))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| RenderError::AssetLoad(format!("cannot decode {src}: {e}")))?;

    let mut png = std::io::Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| RenderError::AssetLoad(format!("cannot re-encode {src}: {e}")))?;

    Ok(LoadedImage {
        data_uri: format!("data:image/png;base64,{}", BASE64.encode(png.into_inner())),
        width: decoded.width(),
        height: decoded.height(),
    })
}
