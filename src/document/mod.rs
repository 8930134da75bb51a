//! # Document Module
//!
//! Word (.docx) side of the generator: reading the layout of a template's first
//! table, and writing the generated table document.
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub mod template;
pub mod writer;

pub use template::read_template;
pub use template::read_template_from;
pub use writer::write_document;

/// Column width used when the template grid does not cover a column, in twentieths of a point.
pub const DEFAULT_COLUMN_WIDTH: u32 = 1500;

/// Errors raised while reading a template or writing a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("The template document contains no table")]
    MissingTable,

    #[error("Missing part '{0}' in document")]
    FileError(String),
}

/// Paragraph alignment of a column's data cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parses a WordprocessingML `w:jc` value; unknown values fall back to CENTER.
    pub fn from_jc(value: &str) -> Self {
        match value {
            "left" | "start" => Alignment::Left,
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" => Alignment::Justify,
            _ => Alignment::Center,
        }
    }

    /// The `w:jc` value written for this alignment.
    pub const fn as_jc(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// Page geometry of the template's first section, in twentieths of a point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSetup {
    pub width: u32,
    pub height: u32,
    pub landscape: bool,
    pub left_margin: u32,
    pub right_margin: u32,
    pub top_margin: u32,
    pub bottom_margin: u32,
}

impl Default for PageSetup {
    /// US Letter portrait with one-inch margins, Word's default section.
    fn default() -> Self {
        PageSetup {
            width: 12_240,
            height: 15_840,
            landscape: false,
            left_margin: 1_440,
            right_margin: 1_440,
            top_margin: 1_440,
            bottom_margin: 1_440,
        }
    }
}

/// One column of the template table, left to right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateColumn {
    pub header: String,
    /// Grid width in twentieths of a point
    pub width: u32,
    /// Whether the sample data row renders bold
    pub bold: bool,
    pub alignment: Alignment,
}

impl TemplateColumn {
    /// A column with default width and formatting.
    pub fn new(header: &str) -> Self {
        TemplateColumn {
            header: header.to_owned(),
            width: DEFAULT_COLUMN_WIDTH,
            bold: false,
            alignment: Alignment::default(),
        }
    }
}

/// Everything read from a template: title, page setup and table columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub title: String,
    pub page: PageSetup,
    pub columns: Vec<TemplateColumn>,
}
