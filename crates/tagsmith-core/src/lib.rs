#![forbid(unsafe_code)]

//! Name-tag template model (headless).
//!
//! Design goals:
//! - every linear measurement is stored in millimeters; units are a boundary concern
//! - template bounds are either valid (strictly positive) or an explicit error
//! - configuration is plain serde data so a run is a pure function of its inputs

pub mod config;
pub mod error;
pub mod font;
pub mod names;
pub mod size;
pub mod template;
pub mod units;

pub use config::{
    GenerationConfig, HorizontalAlignment, OutputMode, SheetConfig, TextCase, TextLayoutConfig,
};
pub use error::{Error, ParseError, Result};
pub use font::{EmbeddedFontDescriptor, FontFormat};
pub use names::{NameEntry, clean_names, parse_name_list};
pub use size::TemplateSizeConfig;
pub use template::{TemplateBounds, TemplateDocument, ViewBox, parse_bounds};
pub use units::{UnitSystem, format_display, from_display, to_display};
