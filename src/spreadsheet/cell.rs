use crate::error::ExpTableError;
use chrono::Duration;
use chrono::NaiveDate;
use std::fmt::Display;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// Represents a single cell in a spreadsheet with position, type, and value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Raw cell value; shared strings are resolved before the cell is stored
    pub(crate) value: String,
}

impl Display for Cell {
    /// Renders the cell the way a user reads it in the spreadsheet application.
    /// Values that fail to convert are written out raw.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let converted = match self.kind {
            CellType::Boolean => Ok(if self.value == "1" { "true" } else { "false" }.to_owned()),
            CellType::Number => to_number_string(&self.value),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberDate1900 => to_date_string(&self.value, false),
            CellType::NumberDate1904 => to_date_string(&self.value, true),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value),
            CellType::IsoDateTime => Ok(self.value.replace('T', " ")),
            _ => Ok(self.value.to_owned()),
        };
        match converted {
            Ok(value) => write!(f, "{}", value),
            Err(_) => write!(f, "{}", self.value),
        }
    }
}

/// Renders a numeric cell; integral values drop the fractional part.
fn to_number_string(value: &str) -> Result<String, ExpTableError> {
    let number = value.parse::<f64>()?;
    if number.fract() == 0.0 && number.abs() < 1e15 {
        Ok(format!("{}", number as i64))
    } else {
        Ok(number.to_string())
    }
}

/// Converts Excel numeric date to ISO date string.
/// Handles Lotus 1-2-3 leap year bug for 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, ExpTableError> {
    let days = value.parse::<f64>()?.trunc() as i64;
    let duration = Duration::days(
        days + if is_1904 {
            1462
        } else if days < 60 {
            1
        } else {
            0
        },
    );
    let date = NaiveDate::from_ymd_opt(1899, 12, 30).expect("NaiveDate Literal") + duration;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts the fractional part of an Excel serial to a `HH:MM:SS` string.
fn to_time_string(value: &str) -> Result<String, ExpTableError> {
    let factor = value.parse::<f64>()?.fract();
    let mut seconds = (factor * 86_400f64).round() as i64;
    let hours = seconds / 3_600; seconds %= 3_600;
    let minutes = seconds / 60; seconds %= 60;
    Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Converts Excel numeric date/time to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, ExpTableError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}
