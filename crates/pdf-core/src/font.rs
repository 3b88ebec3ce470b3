//! Standard 14 font handling for PDF documents
//!
//! Only the twelve Latin text faces (Helvetica, Times, Courier and their
//! bold/oblique variants) are supported. They are referenced by name and
//! never embedded, so a font resource is a single small dictionary.

use lopdf::{Dictionary, Object};

/// Font family of the standard 14 set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// All supported families
    pub const ALL: [FontFamily; 3] = [FontFamily::Helvetica, FontFamily::Times, FontFamily::Courier];

    /// Look up a family by name (case-insensitive)
    ///
    /// Accepts the short family names as well as the PDF base names of the
    /// regular faces, e.g. `"Times-Roman"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "helv" => Some(FontFamily::Helvetica),
            "times" | "times-roman" | "timesroman" | "times roman" => Some(FontFamily::Times),
            "courier" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Oblique,
}

/// One of the twelve built-in text fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StandardFont {
    pub family: FontFamily,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl StandardFont {
    pub fn new(family: FontFamily, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Build from boolean bold/oblique flags
    pub fn from_flags(family: FontFamily, bold: bool, oblique: bool) -> Self {
        let weight = if bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        };
        let style = if oblique {
            FontStyle::Oblique
        } else {
            FontStyle::Normal
        };
        Self::new(family, weight, style)
    }

    /// Every supported font, in family order
    pub fn all() -> Vec<StandardFont> {
        let mut fonts = Vec::with_capacity(12);
        for family in FontFamily::ALL {
            for weight in [FontWeight::Regular, FontWeight::Bold] {
                for style in [FontStyle::Normal, FontStyle::Oblique] {
                    fonts.push(StandardFont::new(family, weight, style));
                }
            }
        }
        fonts
    }

    /// PDF `BaseFont` name
    pub fn base_font_name(&self) -> &'static str {
        use FontFamily::*;
        use FontStyle::*;
        use FontWeight::*;

        match (self.family, self.weight, self.style) {
            (Helvetica, Regular, Normal) => "Helvetica",
            (Helvetica, Bold, Normal) => "Helvetica-Bold",
            (Helvetica, Regular, Oblique) => "Helvetica-Oblique",
            (Helvetica, Bold, Oblique) => "Helvetica-BoldOblique",
            (Times, Regular, Normal) => "Times-Roman",
            (Times, Bold, Normal) => "Times-Bold",
            (Times, Regular, Oblique) => "Times-Italic",
            (Times, Bold, Oblique) => "Times-BoldItalic",
            (Courier, Regular, Normal) => "Courier",
            (Courier, Bold, Normal) => "Courier-Bold",
            (Courier, Regular, Oblique) => "Courier-Oblique",
            (Courier, Bold, Oblique) => "Courier-BoldOblique",
        }
    }

    /// Font dictionary to add to a document
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(self.base_font_name().as_bytes().to_vec()),
        );
        dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        dict
    }
}

/// Encode text as WinAnsiEncoding bytes
///
/// Characters with no WinAnsi code point are replaced with `?`.
/// Returns the encoded bytes and the number of replaced characters.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, usize) {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = 0;

    for c in text.chars() {
        match win_ansi_byte(c) {
            Some(b) => bytes.push(b),
            None => {
                bytes.push(b'?');
                replaced += 1;
            }
        }
    }

    (bytes, replaced)
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E => Some(code as u8),
        // Latin-1 supplement maps 1:1
        0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}

/// Hex string operand for a `Tj` operator, e.g. `<48656C6C6F>`
pub(crate) fn to_hex_string(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2 + 2);
    hex.push('<');
    for b in bytes {
        hex.push_str(&format!("{b:02X}"));
    }
    hex.push('>');
    hex
}
