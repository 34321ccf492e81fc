//! Millimeter/inch conversion for size-bearing fields.
//!
//! Everything inside the engine is stored in millimeters. A [`UnitSystem`] only matters at the
//! input/output boundary (CLI flags, printed stats).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Mm,
    In,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::In => "in",
        }
    }

    /// Decimal places used when presenting a size in this unit.
    pub fn display_precision(self) -> usize {
        match self {
            Self::Mm => 1,
            Self::In => 3,
        }
    }
}

impl FromStr for UnitSystem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Self::Mm),
            "in" | "inch" | "inches" => Ok(Self::In),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

pub fn in_to_mm(inch: f64) -> f64 {
    inch * MM_PER_INCH
}

pub fn to_display(mm: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Mm => mm,
        UnitSystem::In => mm_to_in(mm),
    }
}

pub fn from_display(value: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Mm => value,
        UnitSystem::In => in_to_mm(value),
    }
}

/// Formats a millimeter value in `unit`, trimming trailing zeros (`"60mm"`, `"2.362in"`).
pub fn format_display(mm: f64, unit: UnitSystem) -> String {
    let v = to_display(mm, unit);
    let mut out = format!("{:.*}", unit.display_precision(), v);
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if out == "-0" {
        out = "0".to_string();
    }
    out.push_str(unit.as_str());
    out
}
