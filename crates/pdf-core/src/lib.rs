//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Building a single-page document from a JPEG or PNG image
//! - Inserting text with the standard 14 fonts at specific coordinates
//! - Reducing a document to its first page
//! - Concatenating single-page documents in order
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Color, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open("template.pdf")?;
//! doc.set_font(StandardFont::default(), 96.0);
//! doc.set_text_color(Color::rgb(0.7, 0.7, 0.7));
//! doc.insert_text("John Doe", 1, 300.0, 400.0)?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod font;
mod image;
mod merge;
mod text;

pub use document::{Color, PdfDocument};
pub use font::{encode_win_ansi, FontFamily, FontStyle, FontWeight, StandardFont};
pub use image::{ImageFormat, ImageXObject};
pub use merge::merge_documents;
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
