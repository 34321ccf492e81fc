use crate::error::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Truetype,
    Opentype,
    Woff,
    Woff2,
}

impl FontFormat {
    /// Maps a font file name to its format by extension (`.ttf`, `.otf`, `.woff`, `.woff2`).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "ttf" => Some(Self::Truetype),
            "otf" => Some(Self::Opentype),
            "woff" => Some(Self::Woff),
            "woff2" => Some(Self::Woff2),
            _ => None,
        }
    }

    /// Value for the CSS `format()` hint.
    pub fn css_format(self) -> &'static str {
        match self {
            Self::Truetype => "truetype",
            Self::Opentype => "opentype",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Truetype => "font/ttf",
            Self::Opentype => "font/otf",
            Self::Woff => "font/woff",
            Self::Woff2 => "font/woff2",
        }
    }
}

/// A font carried inside generated documents as a base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedFontDescriptor {
    pub font_family: String,
    pub data_url: String,
    pub format: FontFormat,
}

impl EmbeddedFontDescriptor {
    /// Builds a descriptor from a font file's name and fully-read bytes. The family defaults to
    /// the file stem.
    pub fn from_font_file(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let format =
            FontFormat::from_file_name(file_name).ok_or_else(|| Error::UnsupportedFontFormat {
                file_name: file_name.to_string(),
            })?;
        let font_family = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("EmbeddedFont")
            .to_string();
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self {
            font_family,
            data_url: format!("data:{};base64,{payload}", format.mime_type()),
            format,
        })
    }

    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    /// Checks that the data URL is a base64 `data:` URL whose payload decodes.
    pub fn validate(&self) -> Result<()> {
        self.decoded_payload().map(|_| ())
    }

    pub fn decoded_payload(&self) -> Result<Vec<u8>> {
        let invalid = |message: &str| Error::InvalidFontData {
            message: message.to_string(),
        };
        let rest = self
            .data_url
            .strip_prefix("data:")
            .ok_or_else(|| invalid("data URL must start with `data:`"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("data URL has no `,` separator"))?;
        if !header.ends_with(";base64") {
            return Err(invalid("data URL payload is not base64-encoded"));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidFontData {
                message: e.to_string(),
            })
    }
}
