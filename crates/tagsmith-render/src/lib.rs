#![forbid(unsafe_code)]

//! Headless name-tag rendering: text layout, font embedding, single-tag composition and sheet
//! tiling. Every function here is a pure function of its inputs and emits SVG as a `String`.

pub mod compose;
pub mod font_face;
pub mod layout;
pub mod sheet;
mod svg;
pub mod text;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use std::sync::Arc;

pub use compose::{ComposedTag, compose_tag, render_tag_document};
pub use font_face::{font_face_rule, inject_font_face};
pub use layout::{MIN_LEGIBLE_FONT_SIZE_MM, ResolvedTextLayout, TextRun, resolve_text_layout};
pub use sheet::{RenderedSheet, SheetStats, compute_sheet_stats, render_separate, render_sheet};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Tag size must be positive, got {width}x{height}mm")]
    Layout { width: f64, height: f64 },

    #[error(
        "No {tag_width}x{tag_height}mm tag fits on a {page_width}x{page_height}mm page; reduce margins or spacing, or use a larger page"
    )]
    Capacity {
        page_width: f64,
        page_height: f64,
        tag_width: f64,
        tag_height: f64,
    },

    #[error(transparent)]
    Core(#[from] tagsmith_core::Error),
}

impl From<tagsmith_core::ParseError> for Error {
    fn from(value: tagsmith_core::ParseError) -> Self {
        Self::Core(value.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct RenderOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions").finish_non_exhaustive()
    }
}
