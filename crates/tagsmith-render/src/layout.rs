//! Per-tag text placement.
//!
//! Positions are percentages of the tag box, resolved against the tag size at layout time, so one
//! configuration serves templates of any size.
//!
//! Scale-to-fit is a closed-form computation over the [`TextMeasurer`] estimate, not a render
//! feedback loop:
//!
//! ```text
//! width(fs) = fs * advance_em + letter_spacing * (chars - 1)
//! fit       = (max_width - letter_spacing * (chars - 1)) / advance_em   // when width(fs) > max_width
//! ```
//!
//! `fit` is rounded down to 0.01mm and never goes below [`MIN_LEGIBLE_FONT_SIZE_MM`] (or the
//! configured size, if that is already smaller). Text that still does not fit at the floor is
//! accepted as overflowing.

use crate::text::{TextMeasurer, TextStyle};
use crate::{Error, Result};
use serde::Serialize;
use tagsmith_core::{HorizontalAlignment, NameEntry, TextLayoutConfig};

pub const MIN_LEGIBLE_FONT_SIZE_MM: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub configured_font_size: f64,
    pub estimated_width: f64,
    pub overflows: bool,
}

impl TextRun {
    pub fn was_scaled(&self) -> bool {
        self.font_size < self.configured_font_size
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTextLayout {
    pub alignment: HorizontalAlignment,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub max_width: f64,
    pub first: TextRun,
    pub second: Option<TextRun>,
}

impl ResolvedTextLayout {
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        std::iter::once(&self.first).chain(self.second.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedSize {
    pub font_size: f64,
    pub width: f64,
    pub overflows: bool,
}

/// `percent` of `dimension`, e.g. a 25% position on a 60mm tag is 15mm.
pub fn percent_of(percent: f64, dimension: f64) -> f64 {
    percent / 100.0 * dimension
}

pub fn resolve_text_layout(
    entry: &NameEntry,
    config: &TextLayoutConfig,
    tag_width: f64,
    tag_height: f64,
    measurer: &dyn TextMeasurer,
) -> Result<ResolvedTextLayout> {
    if !(tag_width.is_finite() && tag_height.is_finite() && tag_width > 0.0 && tag_height > 0.0) {
        return Err(Error::Layout {
            width: tag_width,
            height: tag_height,
        });
    }
    let config = config.clamped();

    let anchor_x = percent_of(config.horizontal_position, tag_width);
    let anchor_y = percent_of(config.vertical_position, tag_height);
    let max_width = percent_of(config.max_text_width, tag_width);

    let first = layout_run(
        &config.text_case.apply(entry.name.trim()),
        anchor_x,
        anchor_y,
        config.font_size,
        max_width,
        &config,
        measurer,
    );

    let second = config.second_line_enabled.then(|| {
        // Without a second field the name itself is repeated.
        let text = entry
            .second_line
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| entry.name.trim());
        layout_run(
            &config.text_case.apply(text),
            anchor_x,
            anchor_y + config.second_line_vertical_offset,
            config.second_line_font_size,
            max_width,
            &config,
            measurer,
        )
    });

    Ok(ResolvedTextLayout {
        alignment: config.horizontal_alignment,
        anchor_x,
        anchor_y,
        max_width,
        first,
        second,
    })
}

fn layout_run(
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    max_width: f64,
    config: &TextLayoutConfig,
    measurer: &dyn TextMeasurer,
) -> TextRun {
    let fitted = fit_font_size(
        text,
        font_size,
        config.letter_spacing,
        max_width,
        Some(config.font_family.as_str()),
        measurer,
    );
    if fitted.overflows {
        tracing::warn!(
            text,
            font_size = fitted.font_size,
            width = fitted.width,
            max_width,
            "text overflows its maximum width at the minimum legible size"
        );
    }
    TextRun {
        text: text.to_string(),
        x,
        y,
        font_size: fitted.font_size,
        configured_font_size: font_size,
        estimated_width: fitted.width,
        overflows: fitted.overflows,
    }
}

pub fn fit_font_size(
    text: &str,
    font_size: f64,
    letter_spacing: f64,
    max_width: f64,
    font_family: Option<&str>,
    measurer: &dyn TextMeasurer,
) -> FittedSize {
    let style = |font_size: f64| TextStyle {
        font_family: font_family.map(str::to_string),
        font_size,
        letter_spacing,
    };
    let metrics = measurer.measure(text, &style(font_size));
    if metrics.width <= max_width + 1e-9 || metrics.advance_em <= 0.0 {
        return FittedSize {
            font_size,
            width: metrics.width,
            overflows: false,
        };
    }

    let spacing = letter_spacing * metrics.char_count.saturating_sub(1) as f64;
    let exact = (max_width - spacing) / metrics.advance_em;
    let floor = MIN_LEGIBLE_FONT_SIZE_MM.min(font_size);
    let fitted = ((exact * 100.0 + 1e-9).floor() / 100.0).min(font_size);
    let font_size = if fitted.is_finite() { fitted.max(floor) } else { floor };

    let width = measurer.measure(text, &style(font_size)).width;
    FittedSize {
        font_size,
        width,
        overflows: width > max_width + 1e-9,
    }
}
