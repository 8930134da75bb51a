//! Header map extraction and row previews.

use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::index_to_col;
use crate::spreadsheet::sheet::Sheet;
use serde::Deserialize;
use serde::Serialize;

/// Number of columns scanned for headers: A through Z.
pub const HEADER_COLUMNS: usize = 26;

/// Longest preview value shown by [`peek_rows`], in characters.
const PEEK_VALUE_WIDTH: usize = 90;

/// Spreadsheet column letter to header text, in the order it was built.
///
/// Built in ascending column order and never re-sorted: the mapping engine
/// relies on this order for tie-breaking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Reads the header map of `sheet` at the 1-based `header_row`.
    ///
    /// The header row and the row below it are concatenated with " / " when both
    /// are non-empty; columns whose combined text is blank are left out.
    pub fn from_sheet(sheet: &Sheet, header_row: usize) -> Self {
        let mut entries = Vec::new();
        for col in 0..HEADER_COLUMNS {
            let upper = sheet.value(header_row, col);
            let lower = sheet.value(header_row.saturating_add(1), col);
            let combined = match (upper, lower) {
                (Some(upper), Some(lower)) => format!("{upper} / {lower}"),
                (Some(value), None) | (None, Some(value)) => value,
                (None, None) => continue,
            };
            let combined = combined.trim();
            if !combined.is_empty() {
                entries.push((index_to_col(col), combined.to_owned()));
            }
        }
        HeaderMap { entries }
    }

    /// Iterates over (letter, header) pairs in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(letter, header)| (letter.as_str(), header.as_str()))
    }

    /// Header text of a column letter.
    pub fn get(&self, letter: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(letter))
            .map(|(_, header)| header.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: Into<String>, H: Into<String>> FromIterator<(L, H)> for HeaderMap {
    /// Collects entries and orders them by ascending column, as a sheet scan would.
    fn from_iter<T: IntoIterator<Item = (L, H)>>(iter: T) -> Self {
        let mut entries: Vec<(String, String)> = iter.into_iter()
            .map(|(letter, header)| (letter.into().to_ascii_uppercase(), header.into()))
            .collect();
        entries.sort_by_key(|(letter, _)| col_to_index(letter).unwrap_or(usize::MAX));
        HeaderMap { entries }
    }
}

/// Lists non-empty values of columns A and B, starting two rows below the header
/// row, as `Fila <n>: <value>` lines; stops once `limit` values were listed.
pub fn peek_rows(sheet: &Sheet, header_row: usize, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for row in header_row.saturating_add(2)..=sheet.max_row() {
        for col in 0..2 {
            if let Some(value) = sheet.value(row, col) {
                let value: String = value.chars().take(PEEK_VALUE_WIDTH).collect();
                lines.push(format!("Fila {row}: {value}"));
            }
        }
        if lines.len() >= limit {
            lines.push("...".to_owned());
            break;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::from_rows("ESP", [
            vec!["Reporte", "", "", ""],
            vec![],
            vec!["No.", "", "Fecha", "Entidad"],
            vec!["", "Monto", "Desde", ""],
            vec!["1", "100", "Marzo 2024", "Gobierno de Chile"],
            vec!["2", "", "Abril 2024", ""],
        ])
    }

    #[test]
    fn header_rows_are_combined() {
        let headers = HeaderMap::from_sheet(&sheet(), 3);
        let entries: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(entries, vec![
            ("A", "No."),
            ("B", "Monto"),
            ("C", "Fecha / Desde"),
            ("D", "Entidad"),
        ]);
        assert_eq!(headers.get("c"), Some("Fecha / Desde"));
        assert_eq!(headers.get("E"), None);
    }

    #[test]
    fn blank_header_rows_yield_empty_map() {
        let headers = HeaderMap::from_sheet(&sheet(), 20);
        assert!(headers.is_empty());
    }

    #[test]
    fn last_possible_header_row_reads_nothing() {
        assert!(HeaderMap::from_sheet(&sheet(), usize::MAX).is_empty());
        assert!(peek_rows(&sheet(), usize::MAX, 20).is_empty());
        assert!(peek_rows(&sheet(), usize::MAX - 1, 20).is_empty());
    }

    #[test]
    fn collected_headers_are_column_ordered() {
        let headers: HeaderMap = [("F", "Hasta"), ("d", "Entidad"), ("E", "Desde")].into_iter().collect();
        let letters: Vec<&str> = headers.iter().map(|(letter, _)| letter).collect();
        assert_eq!(letters, vec!["D", "E", "F"]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn peek_lists_first_columns() {
        let lines = peek_rows(&sheet(), 3, 20);
        assert_eq!(lines, vec!["Fila 5: 1", "Fila 5: 100", "Fila 6: 2"]);
    }

    #[test]
    fn peek_stops_at_limit() {
        let lines = peek_rows(&sheet(), 3, 2);
        assert_eq!(lines, vec!["Fila 5: 1", "Fila 5: 100", "..."]);
    }
}
