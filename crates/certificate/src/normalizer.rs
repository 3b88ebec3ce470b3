//! Upload normalization into single-page PDF templates

use crate::{CertificateError, Result};
use pdf_core::{ImageFormat, ImageXObject, PdfDocument};

/// Accepted template upload types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Png,
    Jpeg,
    Pdf,
}

impl MediaType {
    /// Parse a declared content type
    ///
    /// Parameters such as `; charset=...` are ignored and matching is
    /// case-insensitive. `image/jpg` is accepted as JPEG.
    pub fn from_content_type(content_type: &str) -> Result<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/png" => Ok(MediaType::Png),
            "image/jpeg" | "image/jpg" => Ok(MediaType::Jpeg),
            "application/pdf" => Ok(MediaType::Pdf),
            _ => Err(CertificateError::UnsupportedMediaType(
                content_type.to_string(),
            )),
        }
    }
}

/// Turn uploaded bytes into the stored template form
///
/// Images become a one-page PDF whose page is exactly the image's pixel
/// size. PDF input is returned unchanged.
pub fn normalize(data: &[u8], media_type: MediaType) -> Result<Vec<u8>> {
    let format = match media_type {
        MediaType::Pdf => return Ok(data.to_vec()),
        MediaType::Png => ImageFormat::Png,
        MediaType::Jpeg => ImageFormat::Jpeg,
    };

    let image = ImageXObject::decode(data, format)
        .map_err(|e| CertificateError::Decode(e.to_string()))?;
    tracing::debug!(
        width = image.width,
        height = image.height,
        color_space = %image.color_space,
        "decoded template image"
    );

    let mut doc = PdfDocument::from_image(&image)
        .map_err(|e| CertificateError::Decode(e.to_string()))?;
    Ok(doc.to_bytes()?)
}
