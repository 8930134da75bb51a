//! # Spreadsheet Reading Module
//!
//! Reads Excel workbooks (.xlsx, .xlsm) into in-memory sheets, and extracts the
//! header map and row previews the column mapping works from.
use crate::error::ExpTableError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub mod headers;
pub mod reference;
pub mod sheet;
pub mod xlsx;

pub use headers::HeaderMap;
pub use sheet::Sheet;
pub use xlsx::XlsxWorkbook;

/// Errors raised while opening or reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing part '{0}' in spreadsheet")]
    FileError(String),

    #[error("Spreadsheet '{0}' contains no worksheet")]
    SpreadsheetEmptyError(String),

    #[error("Cannot detect spreadsheet format for '{0}', expected .xlsx or .xlsm")]
    InvalidFileFormatError(String),

    #[error("Sheet '{0}' not found. Available: {1}")]
    SheetNotFoundError(String, String),

    #[error("Invalid value in '{0}' sheet '{1}' cell {2}: '{3}'")]
    CellValueError(String, String, String, String),
}

/// Opens a workbook after checking that the file extension is a supported Excel format.
pub fn open_workbook(file_name: &str) -> Result<XlsxWorkbook<BufReader<File>>, ExpTableError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => XlsxWorkbook::open(file_name),
        _ => Err(SpreadsheetError::InvalidFileFormatError(file_name.to_owned()))?,
    }
}
