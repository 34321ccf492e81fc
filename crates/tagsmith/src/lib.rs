#![forbid(unsafe_code)]

//! `tagsmith` stamps names onto an SVG name-tag template.
//!
//! A run takes one template, a list of names and a [`GenerationConfig`], and produces either one
//! tiled sheet SVG or one standalone SVG per name. Runs are synchronous, do no I/O, and are pure
//! functions of their inputs: identical inputs produce byte-identical output.
//!
//! ```no_run
//! use tagsmith::{Generator, TemplateDocument, parse_name_list};
//!
//! let template = TemplateDocument::parse(std::fs::read_to_string("badge.svg")?)?;
//! let names = parse_name_list("Ada Lovelace\nGrace Hopper\n");
//! let content = Generator::new().generate(Some(&template), &names)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use tagsmith_core::*;

pub mod render {
    pub use tagsmith_render::compose::{ComposedTag, compose_tag, render_tag_document};
    pub use tagsmith_render::font_face::{font_face_rule, inject_font_face};
    pub use tagsmith_render::layout::{
        MIN_LEGIBLE_FONT_SIZE_MM, ResolvedTextLayout, TextRun, fit_font_size, percent_of,
        resolve_text_layout,
    };
    pub use tagsmith_render::sheet::{
        RenderedSheet, SheetStats, axis_capacity, compute_sheet_stats, render_separate,
        render_sheet, select_entries, slot_position,
    };
    pub use tagsmith_render::text::{
        DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle,
    };
    pub use tagsmith_render::{Error, RenderOptions};
}

use serde::Serialize;
use std::sync::Arc;
use tagsmith_render::sheet::{SheetStats, compute_sheet_stats, render_separate, render_sheet};
use tagsmith_render::text::TextMeasurer;
use tagsmith_render::RenderOptions;

/// Default file name for sheet output.
pub const SHEET_FILE_NAME: &str = "name-tags-sheet.svg";
/// Archive name external collaborators use when bundling separate-mode output.
pub const ARCHIVE_FILE_NAME: &str = "name-tags-bulk.zip";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Core(#[from] tagsmith_core::Error),
    #[error(transparent)]
    Render(#[from] tagsmith_render::Error),
    #[error("No template loaded")]
    NoTemplate,
    #[error("No names to generate; add at least one non-empty name")]
    NoNames,
}

impl From<ParseError> for GenerateError {
    fn from(value: ParseError) -> Self {
        Self::Core(value.into())
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSvg {
    pub file_name: String,
    pub name: String,
    pub svg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GeneratedContent {
    Sheet { svg: String, stats: SheetStats },
    Separate { files: Vec<GeneratedSvg> },
}

impl GeneratedContent {
    /// `(file name, svg)` pairs ready for a file saver or archiver.
    pub fn into_files(self) -> Vec<(String, String)> {
        match self {
            Self::Sheet { svg, .. } => vec![(SHEET_FILE_NAME.to_string(), svg)],
            Self::Separate { files } => files.into_iter().map(|f| (f.file_name, f.svg)).collect(),
        }
    }
}

/// Whether a run has what it needs: a template and at least one non-blank name.
pub fn can_generate(template: Option<&TemplateDocument>, names: &[NameEntry]) -> bool {
    template.is_some() && names.iter().any(|n| !n.is_blank())
}

/// Lowercase ASCII alphanumerics separated by single `-`; `tag` if nothing survives.
pub fn sanitize_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-');
    if out.is_empty() {
        "tag".to_string()
    } else {
        out.to_string()
    }
}

/// `NNN-<name>.svg` for the `index`-th (0-based) of `total` files. The 1-based index is padded to
/// the width of `total`, at least three digits, so names sort in input order and never collide.
pub fn separate_file_name(index: usize, total: usize, name: &str) -> String {
    let width = index_width(total);
    format!("{:0width$}-{}.svg", index + 1, sanitize_file_stem(name))
}

fn page_file_name(index: usize, total: usize) -> String {
    let width = index_width(total);
    format!("name-tags-sheet-{:0width$}.svg", index + 1)
}

fn index_width(total: usize) -> usize {
    total.max(1).to_string().len().max(3)
}

/// Bundles a [`GenerationConfig`] with render options.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    pub config: GenerationConfig,
    pub render: RenderOptions,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.render.text_measurer = measurer;
        self
    }

    /// The configured tag size, or the template's own bounds when none is set.
    pub fn tag_size(&self, template: &TemplateDocument) -> TemplateSizeConfig {
        self.config
            .template_size
            .unwrap_or_else(|| TemplateSizeConfig::from_bounds(template.bounds()))
    }

    /// Capacity and truncation figures for the current configuration, without rendering.
    pub fn sheet_stats(&self, template: &TemplateDocument, names: &[NameEntry]) -> SheetStats {
        let size = self.tag_size(template);
        let names_count = names.iter().filter(|n| !n.is_blank()).count();
        compute_sheet_stats(size.width, size.height, &self.config.sheet, names_count)
    }

    /// Runs the configured output mode over `names`. Blank names are dropped first.
    pub fn generate(
        &self,
        template: Option<&TemplateDocument>,
        names: &[NameEntry],
    ) -> Result<GeneratedContent> {
        let (template, names) = self.preconditions(template, names)?;
        match self.config.output_mode {
            OutputMode::Sheet => {
                let (svg, stats) = self.sheet(template, &names)?;
                Ok(GeneratedContent::Sheet { svg, stats })
            }
            OutputMode::Separate => Ok(GeneratedContent::Separate {
                files: self.separate(template, &names)?,
            }),
        }
    }

    /// Sheet output regardless of the configured mode.
    pub fn generate_sheet(
        &self,
        template: Option<&TemplateDocument>,
        names: &[NameEntry],
    ) -> Result<(String, SheetStats)> {
        let (template, names) = self.preconditions(template, names)?;
        self.sheet(template, &names)
    }

    /// Separate output regardless of the configured mode.
    pub fn generate_separate(
        &self,
        template: Option<&TemplateDocument>,
        names: &[NameEntry],
    ) -> Result<Vec<GeneratedSvg>> {
        let (template, names) = self.preconditions(template, names)?;
        self.separate(template, &names)
    }

    /// As many sheets as it takes to place every name exactly once.
    ///
    /// Each page is an ordinary single-sheet run over the next `maxTags` names; fill-to-capacity
    /// is ignored so names are never repeated across pages.
    pub fn generate_pages(
        &self,
        template: Option<&TemplateDocument>,
        names: &[NameEntry],
    ) -> Result<Vec<GeneratedSvg>> {
        let (template, names) = self.preconditions(template, names)?;
        let size = self.tag_size(template);
        let sheet = SheetConfig {
            fill_to_capacity: false,
            ..self.config.sheet
        };
        if !size.is_positive() {
            return Err(tagsmith_render::Error::Layout {
                width: size.width,
                height: size.height,
            }
            .into());
        }
        let stats = compute_sheet_stats(size.width, size.height, &sheet, names.len());
        if stats.max_tags == 0 {
            return Err(tagsmith_render::Error::Capacity {
                page_width: sheet.page_width,
                page_height: sheet.page_height,
                tag_width: size.width,
                tag_height: size.height,
            }
            .into());
        }

        let pages = stats.pages_needed();
        let out = names
            .chunks(stats.max_tags)
            .enumerate()
            .map(|(i, chunk)| {
                let rendered = render_sheet(
                    template,
                    chunk,
                    &self.config.text,
                    &size,
                    &sheet,
                    self.render.text_measurer.as_ref(),
                )?;
                Ok(GeneratedSvg {
                    file_name: page_file_name(i, pages),
                    name: format!("page {}", i + 1),
                    svg: rendered.svg,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(pages = out.len(), names = names.len(), "generated pages");
        Ok(out)
    }

    fn preconditions<'t>(
        &self,
        template: Option<&'t TemplateDocument>,
        names: &[NameEntry],
    ) -> Result<(&'t TemplateDocument, Vec<NameEntry>)> {
        let template = template.ok_or(GenerateError::NoTemplate)?;
        let names = clean_names(names);
        if names.is_empty() {
            return Err(GenerateError::NoNames);
        }
        if let Some(font) = self.config.text.embedded_font.as_ref() {
            font.validate()?;
        }
        Ok((template, names))
    }

    fn sheet(
        &self,
        template: &TemplateDocument,
        names: &[NameEntry],
    ) -> Result<(String, SheetStats)> {
        let rendered = render_sheet(
            template,
            names,
            &self.config.text,
            &self.tag_size(template),
            &self.config.sheet,
            self.render.text_measurer.as_ref(),
        )?;
        Ok((rendered.svg, rendered.stats))
    }

    fn separate(&self, template: &TemplateDocument, names: &[NameEntry]) -> Result<Vec<GeneratedSvg>> {
        let total = names.len();
        let files = render_separate(
            template,
            names,
            &self.config.text,
            &self.tag_size(template),
            self.render.text_measurer.as_ref(),
        )?
        .into_iter()
        .enumerate()
        .map(|(i, (tag, svg))| GeneratedSvg {
            file_name: separate_file_name(i, total, &tag.name),
            name: tag.name,
            svg,
        })
        .collect::<Vec<_>>();
        tracing::debug!(files = files.len(), "generated separate tags");
        Ok(files)
    }
}
