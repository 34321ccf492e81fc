//! Sheet tiling: capacity, slot positions and sheet/separate output assembly.

use crate::compose::{ComposedTag, compose_tag, render_tag_document, write_document_start};
use crate::font_face::inject_font_face;
use crate::svg::fmt_into;
use crate::text::TextMeasurer;
use crate::{Error, Result};
use serde::Serialize;
use tagsmith_core::{NameEntry, SheetConfig, TemplateDocument, TemplateSizeConfig, TextLayoutConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetStats {
    pub tags_per_row: usize,
    pub tags_per_column: usize,
    pub max_tags: usize,
    pub names_count: usize,
    pub fill_to_capacity: bool,
    pub will_generate: usize,
}

impl SheetStats {
    /// Names left off the sheet (input order is kept, so these are the last ones).
    pub fn truncated(&self) -> usize {
        self.names_count.saturating_sub(self.max_tags)
    }

    /// Pages needed to place every name once, without cycling.
    pub fn pages_needed(&self) -> usize {
        if self.max_tags == 0 {
            0
        } else {
            self.names_count.div_ceil(self.max_tags)
        }
    }
}

/// How many tags of `tag` length fit along one page axis.
pub fn axis_capacity(page: f64, margin: f64, spacing: f64, tag: f64) -> usize {
    let available = page - 2.0 * margin + spacing;
    let step = tag + spacing;
    if !(available.is_finite() && step.is_finite()) || step <= 0.0 || tag <= 0.0 || available <= 0.0 {
        return 0;
    }
    // The epsilon keeps exact fits (e.g. 195 / 65) from landing just below an integer.
    (available / step + 1e-9).floor() as usize
}

pub fn compute_sheet_stats(
    tag_width: f64,
    tag_height: f64,
    sheet: &SheetConfig,
    names_count: usize,
) -> SheetStats {
    let tags_per_row = axis_capacity(sheet.page_width, sheet.margin_x, sheet.spacing_x, tag_width);
    let tags_per_column =
        axis_capacity(sheet.page_height, sheet.margin_y, sheet.spacing_y, tag_height);
    let max_tags = tags_per_row.saturating_mul(tags_per_column);
    let will_generate = if sheet.fill_to_capacity && names_count > 0 {
        max_tags
    } else {
        names_count.min(max_tags)
    };
    SheetStats {
        tags_per_row,
        tags_per_column,
        max_tags,
        names_count,
        fill_to_capacity: sheet.fill_to_capacity,
        will_generate,
    }
}

/// Top-left corner of slot `index` (row-major).
pub fn slot_position(
    index: usize,
    tags_per_row: usize,
    tag_width: f64,
    tag_height: f64,
    sheet: &SheetConfig,
) -> (f64, f64) {
    let per_row = tags_per_row.max(1);
    let row = index / per_row;
    let column = index % per_row;
    (
        sheet.margin_x + column as f64 * (tag_width + sheet.spacing_x),
        sheet.margin_y + row as f64 * (tag_height + sheet.spacing_y),
    )
}

/// The entries a single sheet places, in slot order.
///
/// Without fill-to-capacity this is the first `max_tags` names. With it, every slot is filled by
/// cycling through the names in input order.
pub fn select_entries<'a>(entries: &'a [NameEntry], stats: &SheetStats) -> Vec<&'a NameEntry> {
    if entries.is_empty() {
        return Vec::new();
    }
    (0..stats.will_generate)
        .map(|i| &entries[i % entries.len()])
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSheet {
    pub svg: String,
    pub stats: SheetStats,
}

/// Lays out one page of tags for `entries` and serializes it as one SVG document.
pub fn render_sheet(
    template: &TemplateDocument,
    entries: &[NameEntry],
    text: &TextLayoutConfig,
    size: &TemplateSizeConfig,
    sheet: &SheetConfig,
    measurer: &dyn TextMeasurer,
) -> Result<RenderedSheet> {
    if !size.is_positive() {
        return Err(Error::Layout {
            width: size.width,
            height: size.height,
        });
    }
    let stats = compute_sheet_stats(size.width, size.height, sheet, entries.len());
    if stats.max_tags == 0 {
        return Err(Error::Capacity {
            page_width: sheet.page_width,
            page_height: sheet.page_height,
            tag_width: size.width,
            tag_height: size.height,
        });
    }
    if stats.truncated() > 0 && !stats.fill_to_capacity {
        tracing::info!(
            names = stats.names_count,
            capacity = stats.max_tags,
            left_off = stats.truncated(),
            "sheet is full; remaining names were not placed"
        );
    }

    let tags = select_entries(entries, &stats)
        .into_iter()
        .map(|entry| compose_tag(template, entry, text, size, measurer))
        .collect::<Result<Vec<_>>>()?;
    let svg = assemble_sheet(template, &tags, stats.tags_per_row, sheet, text)?;

    tracing::debug!(
        placed = tags.len(),
        per_row = stats.tags_per_row,
        per_column = stats.tags_per_column,
        bytes = svg.len(),
        "rendered sheet"
    );
    Ok(RenderedSheet { svg, stats })
}

/// Serializes already-composed tags onto one page, row-major from slot 0. Template ids are
/// prefixed per slot (`tag1-`, `tag2-`, ...) so the page has no duplicates.
pub fn assemble_sheet(
    template: &TemplateDocument,
    tags: &[ComposedTag],
    tags_per_row: usize,
    sheet: &SheetConfig,
    text: &TextLayoutConfig,
) -> Result<String> {
    let body_len: usize = tags.iter().map(|t| t.body().len() + 48).sum();
    let mut out = String::with_capacity(body_len + 512);
    write_document_start(&mut out, template, sheet.page_width, sheet.page_height);
    for (i, tag) in tags.iter().enumerate() {
        let (x, y) = slot_position(i, tags_per_row, tag.width, tag.height, sheet);
        out.push_str("<g transform=\"translate(");
        fmt_into(&mut out, x);
        out.push(' ');
        fmt_into(&mut out, y);
        out.push_str(")\">");
        out.push_str(&tag.scoped_body(template.element_ids(), &format!("tag{}-", i + 1)));
        out.push_str("</g>");
    }
    out.push_str("</svg>\n");
    inject_font_face(&out, text.embedded_font.as_ref())
}

/// One standalone document per entry, each sized to the tag. No tiling.
pub fn render_separate(
    template: &TemplateDocument,
    entries: &[NameEntry],
    text: &TextLayoutConfig,
    size: &TemplateSizeConfig,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<(ComposedTag, String)>> {
    entries
        .iter()
        .map(|entry| {
            let tag = compose_tag(template, entry, text, size, measurer)?;
            let svg = render_tag_document(template, &tag, text.embedded_font.as_ref())?;
            Ok((tag, svg))
        })
        .collect()
}
