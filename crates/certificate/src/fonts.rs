//! Font resolution for field styles

use pdf_core::{FontFamily, StandardFont};

/// Map a field's family name and flags onto a built-in font
///
/// Unknown families fall back to Helvetica with the same bold/oblique
/// combination. This never fails.
pub fn resolve_font(family: &str, bold: bool, oblique: bool) -> StandardFont {
    let family = FontFamily::from_name(family).unwrap_or_else(|| {
        tracing::warn!(family, "unknown font family, falling back to Helvetica");
        FontFamily::Helvetica
    });
    StandardFont::from_flags(family, bold, oblique)
}
