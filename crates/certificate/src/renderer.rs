//! Per-record field rendering

use crate::assembler::FONT_SIZE_SCALE;
use crate::fonts::resolve_font;
use crate::schema::{PositionSpec, Record};
use crate::Result;
use pdf_core::PdfDocument;

/// Draw one record's fields onto a copy of the template page
///
/// `template` must be a single-page PDF (see `prepare_template`). Only
/// fields present in both `record` and `positions` are drawn. Returns the
/// bytes of a new single-page document.
pub fn render_record(template: &[u8], record: &Record, positions: &PositionSpec) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::open_from_bytes(template)?;
    let (page_width, page_height) = doc.page_size(1)?;

    for (field, value) in record {
        let Some(position) = positions.get(field) else {
            tracing::debug!(field = %field, "no position for field, skipping");
            continue;
        };

        let x = position.x * page_width;
        let y = position.y * page_height;
        let font = resolve_font(&value.font_family, value.bold, value.oblique);

        doc.set_font(font, position.font_size * FONT_SIZE_SCALE);
        doc.set_text_color(value.color.into());
        let replaced = doc.insert_text(&value.text, 1, x, y)?;
        if replaced > 0 {
            tracing::warn!(
                field = %field,
                replaced,
                "characters outside WinAnsiEncoding replaced with '?'"
            );
        }
    }

    for field in positions.keys().filter(|f| !record.contains_key(*f)) {
        tracing::debug!(field = %field, "field missing from record, skipping");
    }

    Ok(doc.to_bytes()?)
}
