//! Deterministic text width estimation.
//!
//! There is no font shaping here. Widths come from a fixed per-character em table (roughly a
//! proportional sans-serif), so the same text and style always measure the same on every machine
//! and test expectations can be exact.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// Font size in the caller's length unit (millimeters in this crate).
    pub font_size: f64,
    /// Extra advance added between adjacent characters, same unit as `font_size`.
    pub letter_spacing: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 8.0,
            letter_spacing: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    /// Sum of the per-character advances in em, letter spacing excluded.
    pub advance_em: f64,
    pub char_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    /// Multiplies every table advance; `0.0` means `1.0`.
    pub char_width_factor: f64,
    /// `0.0` means `1.2`.
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            1.0
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(0.0);
        let char_count = text.chars().count();
        let advance_em = text.chars().map(estimate_char_width_em).sum::<f64>() * char_width_factor;
        let spacing = style.letter_spacing * char_count.saturating_sub(1) as f64;

        TextMetrics {
            width: advance_em * font_size + spacing,
            height: font_size * line_height_factor,
            advance_em,
            char_count,
        }
    }
}

pub fn estimate_char_width_em(ch: char) -> f64 {
    if ch == ' ' {
        return 0.33;
    }
    if ch == '\t' {
        return 0.66;
    }
    if ch == '_' || ch == '-' {
        return 0.33;
    }
    if matches!(ch, '.' | ',' | ':' | ';' | '\'' | '!') {
        return 0.28;
    }
    if matches!(ch, '(' | ')' | '[' | ']' | '{' | '}' | '/') {
        return 0.33;
    }
    if matches!(ch, '+' | '*' | '=' | '\\' | '^' | '|' | '~') {
        return 0.45;
    }
    if ch.is_ascii_digit() {
        return 0.56;
    }
    if ch.is_ascii_uppercase() {
        return match ch {
            'I' => 0.30,
            'M' | 'W' => 0.85,
            _ => 0.65,
        };
    }
    if ch.is_ascii_lowercase() {
        return match ch {
            'i' | 'j' | 'l' => 0.25,
            'f' | 't' | 'r' => 0.33,
            'm' | 'w' => 0.80,
            _ => 0.52,
        };
    }
    match ch.width() {
        Some(0) => 0.0,
        Some(2) => 1.0,
        _ => 0.60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font_size: f64, letter_spacing: f64) -> TextStyle {
        TextStyle {
            font_family: None,
            font_size,
            letter_spacing,
        }
    }

    #[test]
    fn width_scales_with_font_size() {
        let m = DeterministicTextMeasurer::default();
        let a = m.measure("Ada", &style(10.0, 0.0));
        let b = m.measure("Ada", &style(20.0, 0.0));
        assert_eq!(a.advance_em, 0.65 + 0.52 + 0.52);
        assert_eq!(b.width, a.width * 2.0);
    }

    #[test]
    fn letter_spacing_applies_between_characters() {
        let m = DeterministicTextMeasurer::default();
        let plain = m.measure("abcd", &style(10.0, 0.0));
        let spaced = m.measure("abcd", &style(10.0, 1.5));
        assert!((spaced.width - plain.width - 4.5).abs() < 1e-9);
        assert_eq!(m.measure("", &style(10.0, 1.5)).width, 0.0);
    }

    #[test]
    fn wide_glyphs_count_one_em() {
        assert_eq!(estimate_char_width_em('名'), 1.0);
        assert_eq!(estimate_char_width_em('\u{301}'), 0.0);
        assert_eq!(estimate_char_width_em('é'), 0.60);
    }

    #[test]
    fn measurement_is_deterministic() {
        let m = DeterministicTextMeasurer::default();
        let s = style(7.25, 0.3);
        assert_eq!(m.measure("Jane Doe", &s), m.measure("Jane Doe", &s));
    }
}
