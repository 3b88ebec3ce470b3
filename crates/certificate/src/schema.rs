//! Generate request schema types

use crate::{CertificateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RGB Color for text, written in JSON as `[r, g, b]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Color {
    /// Red component (0.0 - 1.0)
    pub r: f32,
    /// Green component (0.0 - 1.0)
    pub g: f32,
    /// Blue component (0.0 - 1.0)
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Check every component is a finite value in `[0, 1]`
    pub fn validate(&self, field: &str) -> Result<()> {
        for (name, value) in [("r", self.r), ("g", self.g), ("b", self.b)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CertificateError::InvalidColor {
                    field: field.to_string(),
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for [f32; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}

impl From<Color> for pdf_core::Color {
    fn from(color: Color) -> Self {
        pdf_core::Color::rgb(color.r, color.g, color.b)
    }
}

/// Where a field is drawn on the template page
///
/// `x` and `y` are fractions of the page width and height measured from the
/// bottom-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldPosition {
    pub x: f64,
    pub y: f64,
    /// Size before the fixed scale factor is applied
    pub font_size: f32,
}

impl FieldPosition {
    pub fn new(x: f64, y: f64, font_size: f32) -> Self {
        Self { x, y, font_size }
    }

    /// Check coordinates are finite fractions and the font size is positive
    pub fn validate(&self, field: &str) -> Result<()> {
        let invalid = |reason: String| CertificateError::InvalidPosition {
            field: field.to_string(),
            reason,
        };

        for (name, value) in [("x", self.x), ("y", self.y)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(invalid(format!(
                "fontSize must be positive, got {}",
                self.font_size
            )));
        }

        Ok(())
    }
}

/// Field name to position, shared by every record of a request
pub type PositionSpec = BTreeMap<String, FieldPosition>;

fn default_font_family() -> String {
    "Helvetica".to_string()
}

/// Text and style of one field in one record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyledFieldValue {
    pub text: String,

    #[serde(default)]
    pub color: Color,

    /// Helvetica, Times or Courier
    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default)]
    pub bold: bool,

    #[serde(default, alias = "italic")]
    pub oblique: bool,
}

impl StyledFieldValue {
    /// Plain black Helvetica text
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::default(),
            font_family: default_font_family(),
            bold: false,
            oblique: false,
        }
    }
}

/// Field name to styled value for one certificate
pub type Record = BTreeMap<String, StyledFieldValue>;

/// Body of a generate request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Stored template name as returned by an upload
    pub template_filename: String,

    /// One record per output page, in page order
    pub data: Vec<Record>,

    pub positions: PositionSpec,
}

impl GenerateRequest {
    /// Parse a request from a JSON body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Validate every position and the color of every field that is drawn
    ///
    /// Fields without a position are never rendered, so their style is not
    /// checked.
    pub fn validate(&self) -> Result<()> {
        for (field, position) in &self.positions {
            position.validate(field)?;
        }
        for record in &self.data {
            for (field, value) in record {
                if self.positions.contains_key(field) {
                    value.color.validate(field)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_generate_request() {
        let json = r#"{
            "templateFilename": "3f2a9c",
            "data": [
                {
                    "name": { "text": "John Doe", "color": [0.5, 0, 1], "fontFamily": "Times", "bold": true },
                    "course": { "text": "Rust", "italic": true }
                }
            ],
            "positions": {
                "name": { "x": 0.5, "y": 0.5, "fontSize": 12 }
            }
        }"#;

        let request = GenerateRequest::from_json(json.as_bytes()).unwrap();
        assert_eq!(request.template_filename, "3f2a9c");
        assert_eq!(request.data.len(), 1);

        let name = &request.data[0]["name"];
        assert_eq!(name.text, "John Doe");
        assert_eq!(name.color, Color::rgb(0.5, 0.0, 1.0));
        assert_eq!(name.font_family, "Times");
        assert!(name.bold);
        assert!(!name.oblique);

        let course = &request.data[0]["course"];
        assert_eq!(course.font_family, "Helvetica");
        assert_eq!(course.color, Color::black());
        assert!(course.oblique);

        assert_eq!(request.positions["name"], FieldPosition::new(0.5, 0.5, 12.0));
        request.validate().unwrap();
    }

    #[test]
    fn test_parse_malformed_request() {
        assert!(matches!(
            GenerateRequest::from_json(b"{not json"),
            Err(CertificateError::Json(_))
        ));
        assert!(GenerateRequest::from_json(br#"{"data": []}"#).is_err());
    }

    #[test]
    fn test_position_validation() {
        assert!(FieldPosition::new(0.0, 1.0, 1.0).validate("a").is_ok());
        assert!(FieldPosition::new(1.5, 0.5, 12.0).validate("a").is_err());
        assert!(FieldPosition::new(0.5, -0.1, 12.0).validate("a").is_err());
        assert!(FieldPosition::new(f64::NAN, 0.5, 12.0).validate("a").is_err());
        assert!(FieldPosition::new(0.5, 0.5, 0.0).validate("a").is_err());

        let err = FieldPosition::new(0.5, 0.5, -2.0).validate("name").unwrap_err();
        assert!(matches!(err, CertificateError::InvalidPosition { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_color_validation() {
        assert!(Color::rgb(1.0, 0.0, 0.5).validate("a").is_ok());
        assert!(matches!(
            Color::rgb(1.2, 0.0, 0.0).validate("a"),
            Err(CertificateError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_request_validation_covers_records() {
        let mut record = Record::new();
        let mut value = StyledFieldValue::plain("x");
        value.color = Color::rgb(0.0, 2.0, 0.0);
        record.insert("name".to_string(), value);

        let request = GenerateRequest {
            template_filename: "t".to_string(),
            data: vec![record],
            positions: PositionSpec::from([(
                "name".to_string(),
                FieldPosition::new(0.5, 0.5, 12.0),
            )]),
        };
        assert!(matches!(
            request.validate(),
            Err(CertificateError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_unpositioned_field_color_is_not_checked() {
        let json = r#"{
            "templateFilename": "t",
            "data": [
                {
                    "name": { "text": "Ann" },
                    "note": { "text": "x", "color": [255, 0, 0] }
                }
            ],
            "positions": { "name": { "x": 0.5, "y": 0.5, "fontSize": 12 } }
        }"#;

        let request = GenerateRequest::from_json(json.as_bytes()).unwrap();
        request.validate().unwrap();
    }

    #[test]
    fn test_color_serializes_as_array() {
        let json = serde_json::to_string(&Color::rgb(1.0, 0.5, 0.0)).unwrap();
        assert_eq!(json, "[1.0,0.5,0.0]");
    }
}
