//! Row materialization: mapping plus row numbers to table records.

use crate::config::DEFAULT_COUNTRY_COLUMN;
use crate::mapping::country::extract_country;
use crate::mapping::date::convert_date;
use crate::mapping::ColumnMapping;
use crate::mapping::DataRecord;
use crate::mapping::Source;
use crate::mapping::ValueFormat;
use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::Sheet;
use tracing::debug;

/// Builds one record per requested row, in request order.
///
/// Row numbers below 1 or past the last row of the sheet are skipped. The
/// counter of an auto-increment column is the position of the record among the
/// records produced, so skipped rows leave no gap. Unmapped columns are left
/// out of the records.
pub fn materialize(sheet: &Sheet, rows: &[i64], mapping: &[ColumnMapping]) -> Vec<DataRecord> {
    let max_row = sheet.max_row();
    let mut records = Vec::with_capacity(rows.len());
    for &row in rows {
        let row = match usize::try_from(row) {
            Ok(row) if (1..=max_row).contains(&row) => row,
            _ => {
                debug!(row, max_row, sheet = sheet.name(), "skipped row outside the sheet");
                continue;
            }
        };
        let sequence = records.len() + 1;
        let record: DataRecord = mapping.iter()
            .filter_map(|column| {
                resolve(sheet, row, sequence, column).map(|value| (column.header.clone(), value))
            })
            .collect();
        records.push(record);
    }
    records
}

fn resolve(sheet: &Sheet, row: usize, sequence: usize, column: &ColumnMapping) -> Option<String> {
    match &column.source {
        Source::AutoIncrement => Some(sequence.to_string()),
        Source::ExtractCountry { from_col } => {
            let letter = from_col.as_deref().unwrap_or(DEFAULT_COUNTRY_COLUMN);
            Some(extract_country(&cell_text(sheet, row, letter)))
        }
        Source::Column { letter } => {
            let value = cell_text(sheet, row, letter);
            Some(match column.format {
                Some(ValueFormat::ShortDate) => convert_date(&value),
                None => value,
            })
        }
        Source::Unmapped => None,
    }
}

/// Text of a cell addressed by column letter; empty when the cell or the letter is not valid.
fn cell_text(sheet: &Sheet, row: usize, letter: &str) -> String {
    col_to_index(letter)
        .and_then(|col| sheet.value(row, col))
        .unwrap_or_default()
}
