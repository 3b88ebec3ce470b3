//! Certificate Engine - template normalization and batch rendering
//!
//! This crate provides:
//! - Request schema types (positions, styled field values, records)
//! - Template normalization from PNG, JPEG or PDF uploads
//! - Font resolution onto the standard 14 fonts
//! - Per-record field rendering and ordered batch assembly
//! - Flat-file storage for templates and generated documents
//!
//! # Example
//!
//! ```ignore
//! use certificate::{assemble, GenerateRequest, Storage};
//!
//! let storage = Storage::new("uploads", "generated");
//! let request: GenerateRequest = serde_json::from_slice(body)?;
//! let template = storage.load_template(&request.template_filename)?;
//! let pdf_bytes = assemble(&template, &request.data, &request.positions)?;
//! let path = storage.write_output(&pdf_bytes)?;
//! ```

mod assembler;
mod fonts;
mod normalizer;
mod renderer;
mod schema;
mod storage;

pub use assembler::{assemble, prepare_template, FONT_SIZE_SCALE};
pub use fonts::resolve_font;
pub use normalizer::{normalize, MediaType};
pub use renderer::render_record;
pub use schema::*;
pub use storage::Storage;

use thiserror::Error;

/// Errors that can occur while handling certificates
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Failed to decode template: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid position for field '{field}': {reason}")]
    InvalidPosition { field: String, reason: String },

    #[error("Invalid color for field '{field}': {reason}")]
    InvalidColor { field: String, reason: String },

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for certificate operations
pub type Result<T> = std::result::Result<T, CertificateError>;
