//! Short-date coercion: "Marzo 2024" to "mar-24".

use crate::mapping::keywords::MONTHS;

/// Converts a "<Month> <Year>" value to "<mon>-<yy>".
///
/// Unknown month names are lowercased and cut to three characters. A value that
/// is not exactly two whitespace-separated tokens is returned unchanged.
pub fn convert_date(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let [month, year] = tokens.as_slice() else {
        return value.to_owned();
    };
    let abbreviation = MONTHS.iter()
        .find(|(name, _)| name == month)
        .map(|(_, abbreviation)| (*abbreviation).to_owned())
        .unwrap_or_else(|| month.chars().take(3).collect::<String>().to_lowercase());
    let year_chars: Vec<char> = year.chars().collect();
    let short_year: String = year_chars[year_chars.len().saturating_sub(2)..].iter().collect();
    format!("{abbreviation}-{short_year}")
}
