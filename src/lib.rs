//! # Exp Table Generator
//!
//! Builds a Word table document from selected rows of an Excel sheet, using an
//! existing Word document as the layout template.
//!
//! ## Features
//!
//! - **Template reading**: title, page setup and the first table's columns
//!   (header, width, sample-row bold and alignment) from a `.docx` file
//! - **Spreadsheet reading**: `.xlsx`/`.xlsm` sheets with shared strings,
//!   inline strings and date-formatted numbers
//! - **Mapping inference**: matches template columns to spreadsheet columns by
//!   header similarity, with running counters, country extraction and
//!   short-date formatting
//! - **Editable mappings**: inferred mappings serialize to JSON for manual
//!   correction before generation
//! - **Document writing**: a single shaded-header table mirroring the template
//!   widths and page orientation
//!
//! The [`generator`] module runs the whole flow; the other modules can be used
//! on their own.
pub mod config;
pub mod document;
pub mod error;
pub(crate) mod helpers;
pub mod generator;
pub mod mapping;
pub mod rows;
pub mod spreadsheet;

pub use config::Config;
pub use error::ExpTableError;
pub use generator::generate;
pub use generator::GenerateReport;
pub use generator::GenerateRequest;
