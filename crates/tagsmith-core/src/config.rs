//! Layout and sheet configuration.
//!
//! Field names serialize in camelCase and every struct is `#[serde(default)]`, so a partial JSON
//! document merges onto the defaults.

use crate::error::Result;
use crate::font::EmbeddedFontDescriptor;
use crate::size::TemplateSizeConfig;
use crate::units::UnitSystem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAlignment {
    /// SVG `text-anchor` value.
    pub fn text_anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextCase {
    #[default]
    AsIs,
    Uppercase,
    Capitalize,
}

impl TextCase {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::AsIs => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Capitalize => capitalize_words(text),
        }
    }
}

/// Uppercases the first letter of each whitespace-delimited word and lowercases the rest.
/// Whitespace runs are kept as written.
fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Per-tag text placement. Positions and widths are percentages of the tag box; sizes are mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextLayoutConfig {
    pub horizontal_alignment: HorizontalAlignment,
    pub horizontal_position: f64,
    pub vertical_position: f64,
    pub max_text_width: f64,
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub text_case: TextCase,
    pub second_line_enabled: bool,
    pub second_line_font_size: f64,
    pub second_line_vertical_offset: f64,
    pub embedded_font: Option<EmbeddedFontDescriptor>,
    pub fill: String,
}

impl Default for TextLayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_alignment: HorizontalAlignment::Center,
            horizontal_position: 50.0,
            vertical_position: 50.0,
            max_text_width: 80.0,
            font_family: "Arial".to_string(),
            font_size: 8.0,
            letter_spacing: 0.0,
            text_case: TextCase::AsIs,
            second_line_enabled: false,
            second_line_font_size: 5.0,
            second_line_vertical_offset: 8.0,
            embedded_font: None,
            fill: "#000000".to_string(),
        }
    }
}

impl TextLayoutConfig {
    /// Sets the font family, renaming the embedded font (if any) to match.
    pub fn set_font_family(&mut self, font_family: impl Into<String>) {
        let font_family = font_family.into();
        if let Some(font) = self.embedded_font.as_mut() {
            font.font_family = font_family.clone();
        }
        self.font_family = font_family;
    }

    /// Embeds `font` and switches the text to its family.
    pub fn set_embedded_font(&mut self, font: EmbeddedFontDescriptor) {
        self.font_family = font.font_family.clone();
        self.embedded_font = Some(font);
    }

    /// Percentages clamped to their documented ranges (`maxTextWidth` to 20..=100).
    pub fn clamped(&self) -> Self {
        let clamp = |v: f64, lo: f64, hi: f64, fallback: f64| {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        };
        Self {
            horizontal_position: clamp(self.horizontal_position, 0.0, 100.0, 50.0),
            vertical_position: clamp(self.vertical_position, 0.0, 100.0, 50.0),
            max_text_width: clamp(self.max_text_width, 20.0, 100.0, 80.0),
            letter_spacing: self.letter_spacing.max(0.0),
            second_line_vertical_offset: self.second_line_vertical_offset.max(0.0),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Sheet,
    Separate,
}

/// Page geometry for sheet output, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub fill_to_capacity: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self::a4()
    }
}

impl SheetConfig {
    pub fn a4() -> Self {
        Self::with_page(210.0, 297.0)
    }

    pub fn letter() -> Self {
        Self::with_page(215.9, 279.4)
    }

    /// A page of the given size with 10mm margins and 5mm spacing.
    pub fn with_page(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width,
            page_height,
            margin_x: 10.0,
            margin_y: 10.0,
            spacing_x: 5.0,
            spacing_y: 5.0,
            fill_to_capacity: false,
        }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin_x = margin;
        self.margin_y = margin;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing_x = spacing;
        self.spacing_y = spacing;
        self
    }
}

/// Everything a generation run reads besides the template and the names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    pub output_mode: OutputMode,
    pub unit_system: UnitSystem,
    /// `None` means "use the template's own bounds".
    pub template_size: Option<TemplateSizeConfig>,
    pub text: TextLayoutConfig,
    pub sheet: SheetConfig,
}

impl GenerationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_case_transforms() {
        assert_eq!(TextCase::Capitalize.apply("jane doe"), "Jane Doe");
        assert_eq!(TextCase::Uppercase.apply("jane doe"), "JANE DOE");
        assert_eq!(TextCase::AsIs.apply("jane doe"), "jane doe");
    }

    #[test]
    fn capitalize_lowercases_the_rest_and_keeps_spacing() {
        assert_eq!(TextCase::Capitalize.apply("mcDONALD  o'BRIEN"), "Mcdonald  O'brien");
        assert_eq!(TextCase::Capitalize.apply("élodie"), "Élodie");
    }

    #[test]
    fn partial_json_merges_onto_defaults() {
        let cfg = GenerationConfig::from_json_str(
            r#"{
                "outputMode": "separate",
                "text": { "horizontalAlignment": "left", "textCase": "as-is", "fontSize": 6 },
                "sheet": { "fillToCapacity": true }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.output_mode, OutputMode::Separate);
        assert_eq!(cfg.text.horizontal_alignment, HorizontalAlignment::Left);
        assert_eq!(cfg.text.font_size, 6.0);
        assert_eq!(cfg.text.font_family, "Arial");
        assert_eq!(cfg.sheet.page_width, 210.0);
        assert!(cfg.sheet.fill_to_capacity);
        assert!(cfg.template_size.is_none());
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let err = GenerationConfig::from_json_str(r#"{ "text": { "textCase": "shout" } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn renaming_font_family_renames_embedded_font() {
        let mut text = TextLayoutConfig::default();
        text.set_embedded_font(EmbeddedFontDescriptor {
            font_family: "Brand".to_string(),
            data_url: "data:font/ttf;base64,AAAA".to_string(),
            format: crate::font::FontFormat::Truetype,
        });
        assert_eq!(text.font_family, "Brand");
        text.set_font_family("Brand Bold");
        assert_eq!(
            text.embedded_font.as_ref().map(|f| f.font_family.as_str()),
            Some("Brand Bold")
        );
    }

    #[test]
    fn clamped_keeps_percentages_in_range() {
        let text = TextLayoutConfig {
            horizontal_position: 140.0,
            max_text_width: 5.0,
            letter_spacing: -1.0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(text.horizontal_position, 100.0);
        assert_eq!(text.max_text_width, 20.0);
        assert_eq!(text.letter_spacing, 0.0);
    }
}
