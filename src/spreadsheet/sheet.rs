use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use std::collections::HashMap;

/// Represents a worksheet loaded in memory, addressable by (row, col).
pub struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in document order
    pub(crate) cells: Vec<Cell>,
    /// (row, col) to position in `cells`
    index: HashMap<(usize, usize), usize>,
    /// Largest 0-based row index declared by the worksheet, empty rows included
    row_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            index: HashMap::new(),
            row_upper_bound: None,
        }
    }

    /// Builds a sheet from rows of text values starting at A1; empty strings leave the cell empty.
    pub fn from_rows<R, V>(name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut sheet = Sheet::new("", name);
        for (row, values) in rows.into_iter().enumerate() {
            sheet.mark_row(row);
            for (col, value) in values.into_iter().enumerate() {
                let value = value.as_ref();
                if !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind: CellType::InlineString,
                        value: value.to_owned(),
                    });
                }
            }
        }
        sheet
    }

    /// Returns the sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file the sheet was read from.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet; a later cell at the same position replaces the earlier one.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.mark_row(cell.row);
        let key = (cell.row, cell.col);
        match self.index.get(&key) {
            Some(position) => self.cells[*position] = cell,
            None => {
                self.index.insert(key, self.cells.len());
                self.cells.push(cell);
            }
        }
    }

    /// Records that a row exists even when none of its cells carry a value.
    pub(crate) fn mark_row(&mut self, row: usize) {
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
    }

    /// Largest 1-based row number of the sheet, 0 when the sheet has no rows.
    pub fn max_row(&self) -> usize {
        self.row_upper_bound.map(|row| row + 1).unwrap_or(0)
    }

    /// Returns the cell at 1-based `row` and 0-based `col`.
    pub(crate) fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        let row = row.checked_sub(1)?;
        self.index.get(&(row, col)).map(|position| &self.cells[*position])
    }

    /// Rendered value of the cell at 1-based `row` and 0-based `col`; `None` for empty cells.
    pub fn value(&self, row: usize, col: usize) -> Option<String> {
        self.cell(row, col)
            .map(|cell| cell.to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::cell::{Cell, CellType};
    use crate::spreadsheet::sheet::Sheet;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.to_owned(),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("", "");

        assert!(sheet.is_empty());
        assert_eq!(sheet.max_row(), 0);
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("", "");
        push(&mut sheet, 1, 1, "b2");
        push(&mut sheet, 1, 3, "d2");
        push(&mut sheet, 3, 1, "b4");
        push(&mut sheet, 3, 3, "d4");

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.max_row(), 4);
        assert_eq!(sheet.value(2, 1).as_deref(), Some("b2"));
        assert_eq!(sheet.value(4, 3).as_deref(), Some("d4"));
        assert_eq!(sheet.value(3, 1), None);
        assert_eq!(sheet.value(0, 1), None);
    }

    #[test]
    fn sheet_update_replaces_cell() {
        let mut sheet = Sheet::new("", "");
        push(&mut sheet, 0, 0, "old");
        push(&mut sheet, 0, 0, "new");

        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.value(1, 0).as_deref(), Some("new"));
    }

    #[test]
    fn sheet_marked_rows_extend_max_row() {
        let mut sheet = Sheet::new("", "");
        push(&mut sheet, 0, 0, "a1");
        sheet.mark_row(9);

        assert_eq!(sheet.max_row(), 10);
        assert_eq!(sheet.value(10, 0), None);
    }

    #[test]
    fn sheet_from_rows() {
        let sheet = Sheet::from_rows("ESP", [vec!["a", ""], vec!["", "b"]]);

        assert_eq!(sheet.name(), "ESP");
        assert_eq!(sheet.cells.len(), 2);
        assert_eq!(sheet.value(1, 0).as_deref(), Some("a"));
        assert_eq!(sheet.value(1, 1), None);
        assert_eq!(sheet.value(2, 1).as_deref(), Some("b"));
    }
}
