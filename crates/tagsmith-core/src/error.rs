pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unsupported font format: {file_name} (expected .ttf, .otf, .woff or .woff2)")]
    UnsupportedFontFormat { file_name: String },

    #[error("Invalid embedded font data: {message}")]
    InvalidFontData { message: String },

    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while extracting usable bounds from template markup.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Template is not well-formed XML: {message}")]
    Xml { message: String },

    #[error("Template root element is <{found}>, expected <svg>")]
    MissingRoot { found: String },

    #[error("Template has no usable width/height or viewBox")]
    MissingDimensions,

    #[error("Invalid length in `{attribute}` attribute: {value:?}")]
    InvalidLength { attribute: &'static str, value: String },

    #[error("Invalid viewBox: {value:?}")]
    InvalidViewBox { value: String },
}

impl From<roxmltree::Error> for ParseError {
    fn from(value: roxmltree::Error) -> Self {
        Self::Xml {
            message: value.to_string(),
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(value: roxmltree::Error) -> Self {
        Self::Parse(value.into())
    }
}
