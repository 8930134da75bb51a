//! Conversions between Excel-style references ("B7") and 0-based indexes.

/// Converts column letters (case-insensitive) to a 0-based column index: A = 0, Z = 25, AA = 26.
/// Returns `None` for anything that is not letters, or too long to index.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0usize, |index, letter| {
            index.checked_mul(26)?.checked_add((letter - b'A') as usize + 1)
        })
        .map(|col| col - 1)
}

/// Converts a 0-based column index to column letters: 0 = A, 26 = AA.
pub fn index_to_col(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = String::new();
    while col > 0 {
        col -= 1;
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    letters
}

/// Converts a 1-based row number string to a 0-based row index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Splits a cell reference such as "C12" into 0-based (row, col).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters)?;
    let row = row_to_index(digits)?;
    Some((row, col))
}

/// Builds an Excel-style reference from 0-based (row, col).
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_index("A"), Some(0));
        assert_eq!(col_to_index("z"), Some(25));
        assert_eq!(col_to_index("AA"), Some(26));
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
        assert_eq!(col_to_index("XFD"), Some(16_383));
        assert_eq!(col_to_index("ZZZZZZZZZZZZZZZZ"), None);
        assert_eq!(index_to_col(0), "A");
        assert_eq!(index_to_col(25), "Z");
        assert_eq!(index_to_col(27), "AB");
    }

    #[test]
    fn cell_references() {
        assert_eq!(reference_to_index("C12"), Some((11, 2)));
        assert_eq!(reference_to_index("C0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(index_to_reference(0, 0), "A1");
    }
}
