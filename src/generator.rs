//! # Generation Flow
//!
//! Ties the readers, the mapping engine and the document writer together. This
//! is the only layer that touches files; every failure leaving it carries a
//! message naming the step that failed.
use crate::config::Config;
use crate::document;
use crate::document::TemplateInfo;
use crate::error::ExpTableError;
use crate::error::ResultMessage;
use crate::mapping::engine::entity_column;
use crate::mapping::infer_mapping_with;
use crate::mapping::materialize;
use crate::mapping::ColumnMapping;
use crate::mapping::Source;
use crate::rows::parse_rows;
use crate::spreadsheet::open_workbook;
use crate::spreadsheet::HeaderMap;
use crate::spreadsheet::Sheet;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Errors raised by the generation flow itself.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Enter at least one row number")]
    EmptySelectionError,

    #[error("Every template column is unmapped")]
    NoMappedColumnsError,

    #[error("No data found in sheet '{0}' for rows {1}")]
    NoRowsError(String, String),
}

/// Reads the template, turning failures into a user-facing message.
pub fn load_template(file_name: &str) -> Result<TemplateInfo, ExpTableError> {
    let template = document::read_template(file_name).with_prefix("Could not read the template")?;
    info!(file = file_name, title = %template.title, columns = template.columns.len(), "loaded template");
    Ok(template)
}

/// Reads one sheet of a workbook, turning failures into a user-facing message.
pub fn load_sheet(file_name: &str, sheet_name: &str) -> Result<Sheet, ExpTableError> {
    let sheet = open_workbook(file_name)
        .and_then(|mut workbook| workbook.read_sheet(sheet_name))
        .with_prefix("Could not read the spreadsheet")?;
    debug!(file = file_name, sheet = sheet_name, max_row = sheet.max_row(), "loaded sheet");
    Ok(sheet)
}

/// Reads the header map of the configured sheet and header row.
pub fn load_headers(file_name: &str, config: &Config) -> Result<HeaderMap, ExpTableError> {
    let sheet = load_sheet(file_name, &config.sheet)?;
    let headers = HeaderMap::from_sheet(&sheet, config.header_row);
    info!(file = file_name, sheet = %config.sheet, headers = headers.len(), "read spreadsheet headers");
    Ok(headers)
}

/// Infers the mapping between a template and a spreadsheet.
pub fn infer(template_file: &str, spreadsheet_file: &str, config: &Config) -> Result<Vec<ColumnMapping>, ExpTableError> {
    let template = load_template(template_file)?;
    let headers = load_headers(spreadsheet_file, config)?;
    Ok(infer_mapping_with(&template.columns, &headers, &config.inference))
}

/// Inputs of one document generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub template: String,
    pub spreadsheet: String,
    /// Row selection text, e.g. "50, 51" or "10-15"
    pub rows: String,
    /// Output path; defaults to [`default_output_path`]
    pub output: Option<PathBuf>,
    /// Edited mapping to use instead of inferring one
    pub mapping: Option<Vec<ColumnMapping>>,
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub records: usize,
    /// Headers of the columns written, in order
    pub columns: Vec<String>,
}

/// Generates the table document for the requested rows.
///
/// The row selection is validated before any file is opened. Unmapped columns
/// are dropped; the flow fails when none remain or when none of the selected
/// rows exist in the sheet.
pub fn generate(request: &GenerateRequest, config: &Config) -> Result<GenerateReport, ExpTableError> {
    let rows = parse_rows(&request.rows)?;
    if rows.is_empty() {
        Err(GeneratorError::EmptySelectionError)?
    }

    let template = load_template(&request.template)?;
    let sheet = load_sheet(&request.spreadsheet, &config.sheet)?;
    let headers = HeaderMap::from_sheet(&sheet, config.header_row);

    let mapping = match &request.mapping {
        Some(mapping) => mapping.clone(),
        None => infer_mapping_with(&template.columns, &headers, &config.inference),
    };
    let mapping = finalize_mapping(mapping, &headers, config);
    if mapping.is_empty() {
        Err(GeneratorError::NoMappedColumnsError)?
    }

    let records = materialize(&sheet, &rows, &mapping);
    if records.is_empty() {
        Err(GeneratorError::NoRowsError(sheet.name().to_owned(), request.rows.trim().to_owned()))?
    }

    let output = request.output.clone()
        .unwrap_or_else(|| default_output_path(&request.spreadsheet, &rows));
    let output_name = output.to_string_lossy();
    document::write_document(&output_name, &template, &mapping, &records)
        .with_prefix(&format!("Could not write '{output_name}'"))?;
    info!(file = %output_name, records = records.len(), columns = mapping.len(), "generated document");

    Ok(GenerateReport {
        columns: mapping.iter().map(|column| column.header.clone()).collect(),
        records: records.len(),
        output,
    })
}

/// Drops unmapped columns and resolves country columns that name no source column.
fn finalize_mapping(mapping: Vec<ColumnMapping>, headers: &HeaderMap, config: &Config) -> Vec<ColumnMapping> {
    mapping.into_iter()
        .filter(|column| {
            if !column.source.is_mapped() {
                warn!(header = %column.header, "dropped unmapped column");
            }
            column.source.is_mapped()
        })
        .map(|mut column| {
            if let Source::ExtractCountry { from_col } = &mut column.source {
                if from_col.is_none() {
                    *from_col = Some(entity_column(headers, &config.inference.fallback_country_column));
                }
            }
            column
        })
        .collect()
}

/// Longest row label put in a default file name, in bytes.
const MAX_ROW_LABEL: usize = 120;

/// `Tabla_filas_<rows>.docx`, next to the spreadsheet.
///
/// Rows are joined by `_`; three or more consecutive rows collapse to `first-last`.
/// Labels longer than [`MAX_ROW_LABEL`] are cut at a row boundary and end with `_etc`.
pub fn default_output_path(spreadsheet: &str, rows: &[i64]) -> PathBuf {
    let file_name = format!("Tabla_filas_{}.docx", row_label(rows));
    Path::new(spreadsheet)
        .parent()
        .map(|directory| directory.join(&file_name))
        .unwrap_or_else(|| PathBuf::from(&file_name))
}

fn row_label(rows: &[i64]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut index = 0;
    while index < rows.len() {
        let first = rows[index];
        let mut last = index;
        while last + 1 < rows.len() && rows[last].checked_add(1) == Some(rows[last + 1]) {
            last += 1;
        }
        match last - index {
            0 => parts.push(first.to_string()),
            1 => {
                parts.push(first.to_string());
                parts.push(rows[last].to_string());
            }
            _ => parts.push(format!("{first}-{}", rows[last])),
        }
        index = last + 1;
    }

    let mut label = String::new();
    for part in parts {
        let separator = if label.is_empty() { "" } else { "_" };
        if label.len() + separator.len() + part.len() > MAX_ROW_LABEL {
            label.push_str("_etc");
            break;
        }
        label.push_str(separator);
        label.push_str(&part);
    }
    label
}
