//! Name lists: plain text (one name per line) or simple CSV (`name[,second line]`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_line: Option<String>,
}

impl NameEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            second_line: None,
        }
    }

    pub fn with_second_line(mut self, second_line: impl Into<String>) -> Self {
        self.second_line = Some(second_line.into());
        self
    }

    /// A name that trims to nothing is not a name; it is filtered out before layout.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl From<&str> for NameEntry {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NameEntry {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Parses a name list. Each record is one entry; a second comma-separated field becomes the
/// entry's second line. Quoted fields may span lines and contain commas and `""` escapes. A
/// leading `name,<second>` header row is skipped.
pub fn parse_name_list(text: &str) -> Vec<NameEntry> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let mut out = Vec::new();
    let mut header_checked = false;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable name record");
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        if !header_checked {
            header_checked = true;
            if is_header(&record) {
                continue;
            }
        }
        let entry = NameEntry {
            name: record.get(0).unwrap_or_default().to_string(),
            second_line: record.get(1).filter(|s| !s.is_empty()).map(str::to_string),
        };
        if !entry.is_blank() {
            out.push(entry);
        }
    }
    out
}

/// `Name,Title`-shaped: a `name` column followed by at least one more column.
fn is_header(record: &csv::StringRecord) -> bool {
    record.len() >= 2 && record.get(0).is_some_and(|f| f.eq_ignore_ascii_case("name"))
}

/// Trims names and drops blank entries, keeping input order.
pub fn clean_names(names: &[NameEntry]) -> Vec<NameEntry> {
    names
        .iter()
        .filter(|n| !n.is_blank())
        .map(|n| NameEntry {
            name: n.name.trim().to_string(),
            second_line: n
                .second_line
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
        .collect()
}
