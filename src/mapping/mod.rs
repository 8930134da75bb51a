//! # Column Mapping Module
//!
//! Infers which spreadsheet column feeds each template column, and turns a
//! finished mapping plus a list of row numbers into table records.
//!
//! A mapping produced by [`infer_mapping`] never assigns the same spreadsheet
//! column to two letter-sourced entries. Mappings edited by hand and loaded back
//! with [`load_mapping`] are accepted as they are, including ones that reuse a
//! column.
use crate::document::Alignment;
use crate::document::TemplateColumn;
use crate::error::ExpTableError;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fs;

pub mod country;
pub mod date;
pub mod engine;
pub mod keywords;
pub mod materialize;
pub mod text;

pub use country::extract_country;
pub use date::convert_date;
pub use engine::infer_mapping;
pub use engine::infer_mapping_with;
pub use materialize::materialize;
pub use text::normalize;
pub use text::overlap;

/// One rendered table row: template column header to cell text.
pub type DataRecord = HashMap<String, String>;

/// Where the values of an output column come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Source {
    /// A spreadsheet column, by letter
    Column { letter: String },
    /// 1-based position among the produced records
    AutoIncrement,
    /// Country name found in the text of another column
    ExtractCountry {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_col: Option<String>,
    },
    /// No source found; left for manual correction
    Unmapped,
}

impl Source {
    pub fn is_mapped(&self) -> bool {
        !matches!(self, Source::Unmapped)
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Source::Column { letter } => write!(f, "{letter}"),
            Source::AutoIncrement => write!(f, "(auto-increment)"),
            Source::ExtractCountry { from_col: Some(letter) } => write!(f, "(extract-country from {letter})"),
            Source::ExtractCountry { from_col: None } => write!(f, "(extract-country)"),
            Source::Unmapped => write!(f, "(unmapped)"),
        }
    }
}

/// Value coercion applied to a letter-sourced column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueFormat {
    /// "Marzo 2024" becomes "mar-24"
    ShortDate,
}

/// One output column: template layout plus value source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub header: String,
    pub width: u32,
    pub bold: bool,
    pub alignment: Alignment,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
}

impl ColumnMapping {
    /// Copies the layout of a template column and attaches a source.
    pub fn from_template(column: &TemplateColumn, source: Source, format: Option<ValueFormat>) -> Self {
        ColumnMapping {
            header: column.header.clone(),
            width: column.width,
            bold: column.bold,
            alignment: column.alignment,
            source,
            format,
        }
    }
}

/// Reads a mapping previously written by [`save_mapping`] and possibly edited by hand.
pub fn load_mapping(file_name: &str) -> Result<Vec<ColumnMapping>, ExpTableError> {
    let content = fs::read_to_string(file_name)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes a mapping as pretty-printed JSON.
pub fn save_mapping(file_name: &str, mapping: &[ColumnMapping]) -> Result<(), ExpTableError> {
    let content = serde_json::to_string_pretty(mapping)?;
    fs::write(file_name, content)?;
    Ok(())
}
