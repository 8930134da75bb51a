use crate::error::ExpTableError;
use regex::Regex;
use thiserror::Error;

/// Errors raised while parsing a row selection.
#[derive(Error, Debug)]
pub enum RowSelectionError {
    #[error("Invalid row number '{0}', expected a number or a range such as 10-15")]
    InvalidTokenError(String),

    #[error("Row range '{0}' spans more than 1048576 rows")]
    RangeTooLargeError(String),
}

/// Rows in an Excel worksheet; a single range never expands past this count.
pub const MAX_RANGE_ROWS: i64 = 1_048_576;

/// Parses a row selection such as "50, 51" or "10-15; 20".
///
/// Tokens are separated by commas, semicolons or whitespace. A token `a-b`
/// expands to every row from `a` to `b` inclusive, nothing when `b < a`. Numbers
/// are not range-checked here: rows outside the sheet are dropped when the rows
/// are read.
///
/// # Arguments
///
/// * `selection` - Row selection text as typed by the user
///
/// # Returns
///
/// The selected row numbers in the order given, or the first invalid token.
/// A range covering more rows than a worksheet holds is rejected.
pub fn parse_rows(selection: &str) -> Result<Vec<i64>, ExpTableError> {
    let single = Regex::new(r"^[+-]?\d+$").expect("Hardcode regex pattern");
    let range = Regex::new(r"^(\+?\d+)-([+-]?\d+)$").expect("Hardcode regex pattern");

    let mut rows = Vec::new();
    for token in selection.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let invalid = || RowSelectionError::InvalidTokenError(token.to_owned());
        if single.is_match(token) {
            rows.push(token.parse::<i64>().map_err(|_| invalid())?);
        } else if let Some(captures) = range.captures(token) {
            let start = captures[1].parse::<i64>().map_err(|_| invalid())?;
            let end = captures[2].parse::<i64>().map_err(|_| invalid())?;
            if end.saturating_sub(start) >= MAX_RANGE_ROWS {
                Err(RowSelectionError::RangeTooLargeError(token.to_owned()))?
            }
            rows.extend(start..=end);
        } else {
            Err(invalid())?;
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_numbers() {
        assert_eq!(parse_rows("50, 51").unwrap(), vec![50, 51]);
        assert_eq!(parse_rows(" 7;8\t9\n10 ").unwrap(), vec![7, 8, 9, 10]);
    }

    #[test]
    fn inclusive_ranges() {
        assert_eq!(parse_rows("10-15").unwrap(), vec![10, 11, 12, 13, 14, 15]);
        assert_eq!(parse_rows("3, 5-6, 1").unwrap(), vec![3, 5, 6, 1]);
        assert_eq!(parse_rows("4-4").unwrap(), vec![4]);
    }

    #[test]
    fn reversed_range_is_empty() {
        assert_eq!(parse_rows("15-10").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn negative_and_zero_rows_are_kept_for_later_filtering() {
        assert_eq!(parse_rows("-5, 0, +2").unwrap(), vec![-5, 0, 2]);
    }

    #[test]
    fn blank_selection_is_empty() {
        assert!(parse_rows("").unwrap().is_empty());
        assert!(parse_rows(" ,; ").unwrap().is_empty());
    }

    #[test]
    fn invalid_tokens_fail() {
        for selection in ["abc", "5-", "1-2-3", "7, x", "1.5", "99999999999999999999"] {
            let error = parse_rows(selection).err().unwrap();
            assert!(
                matches!(error, ExpTableError::RowSelectionError(RowSelectionError::InvalidTokenError(_))),
                "selection {selection:?}"
            );
        }
        assert_eq!(
            parse_rows("5, 6-x").err().unwrap().to_string(),
            "Invalid row number '6-x', expected a number or a range such as 10-15"
        );
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        let error = parse_rows("1-99999999999999").err().unwrap();
        assert!(matches!(error, ExpTableError::RowSelectionError(RowSelectionError::RangeTooLargeError(_))));
        assert_eq!(
            error.to_string(),
            "Row range '1-99999999999999' spans more than 1048576 rows"
        );
        assert_eq!(parse_rows("1-1048576").unwrap().len(), 1_048_576);
        assert!(parse_rows("0-1048576").is_err());
    }
}
