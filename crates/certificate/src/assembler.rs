//! Batch assembly of certificates
//!
//! Records are rendered independently on the rayon pool and the resulting
//! pages are concatenated in record order.

use crate::renderer::render_record;
use crate::schema::{PositionSpec, Record};
use crate::{CertificateError, Result};
use pdf_core::{merge_documents, PdfDocument, PdfError};
use rayon::prelude::*;

/// Multiplier applied to every position's `fontSize`
pub const FONT_SIZE_SCALE: f32 = 8.0;

/// Reduce a stored template to its first page
///
/// Attributes the page inherits from the page tree are copied onto it so
/// it renders identically in isolation.
pub fn prepare_template(template: &[u8]) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::open_from_bytes(template)
        .map_err(|e| CertificateError::InvalidTemplate(e.to_string()))?;

    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(CertificateError::InvalidTemplate(
            "template has no pages".to_string(),
        ));
    }
    if page_count > 1 {
        tracing::debug!(page_count, "template has several pages, using the first");
    }

    doc.retain_first_page()?;
    Ok(doc.to_bytes()?)
}

/// Render every record onto the template and merge the pages
///
/// Page `i` of the result shows record `i`. An empty record list produces a
/// valid document with zero pages.
pub fn assemble(template: &[u8], records: &[Record], positions: &PositionSpec) -> Result<Vec<u8>> {
    let template = prepare_template(template)?;

    let mut pages: Vec<(usize, Vec<u8>)> = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| {
            tracing::debug!(index, fields = record.len(), "rendering record");
            render_record(&template, record, positions).map(|bytes| (index, bytes))
        })
        .collect::<Result<_>>()?;

    pages.sort_by_key(|(index, _)| *index);
    let pages: Vec<Vec<u8>> = pages.into_iter().map(|(_, bytes)| bytes).collect();

    merge_documents(&pages).map_err(|e| match e {
        PdfError::OpenError(msg) => CertificateError::InvalidTemplate(msg),
        other => other.into(),
    })
}
