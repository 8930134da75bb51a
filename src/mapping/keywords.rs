//! Fixed keyword tables and the header classifiers built on them.

use crate::mapping::text::normalize;
use crate::mapping::text::words;

/// Headers of running-counter columns.
pub const ROW_INDEX_HEADERS: [&str; 5] = ["no", "no.", "n", "#", "numero"];

/// Headers of columns derived from the entity's country.
pub const COUNTRY_HEADERS: [&str; 3] = ["pais", "country", "paises"];

/// Words marking the start of a date range in a template header.
pub const START_KEYWORDS: [&str; 4] = ["inicio", "desde", "from", "start"];

/// Words marking the end of a date range in a template header.
pub const END_KEYWORDS: [&str; 4] = ["fin", "hasta", "end", "until"];

/// Substrings of a spreadsheet header that boost a start-date match.
pub const START_BOOST_KEYWORDS: [&str; 3] = ["desde", "inicio", "from"];

/// Substrings of a spreadsheet header that boost an end-date match.
pub const END_BOOST_KEYWORDS: [&str; 3] = ["hasta", "fin", "until"];

/// Substrings identifying the spreadsheet column holding the entity name.
pub const ENTITY_HEADER_KEYWORDS: [&str; 2] = ["entidad", "contratante"];

/// Spanish month names and their three-letter abbreviations.
pub const MONTHS: [(&str, &str); 12] = [
    ("Enero", "ene"),
    ("Febrero", "feb"),
    ("Marzo", "mar"),
    ("Abril", "abr"),
    ("Mayo", "may"),
    ("Junio", "jun"),
    ("Julio", "jul"),
    ("Agosto", "ago"),
    ("Septiembre", "sep"),
    ("Octubre", "oct"),
    ("Noviembre", "nov"),
    ("Diciembre", "dic"),
];

/// Country names as written in entity names, with their canonical spelling.
/// Scanned in order.
pub const COUNTRIES: [(&str, &str); 22] = [
    ("Argentina", "Argentina"),
    ("argentina", "Argentina"),
    ("Perú", "Perú"),
    ("Peru", "Perú"),
    ("Colombia", "Colombia"),
    ("Chile", "Chile"),
    ("Bolivia", "Bolivia"),
    ("Ecuador", "Ecuador"),
    ("Brasil", "Brasil"),
    ("Paraguay", "Paraguay"),
    ("Uruguay", "Uruguay"),
    ("México", "México"),
    ("Mexico", "México"),
    ("Panamá", "Panamá"),
    ("Panama", "Panamá"),
    ("Costa Rica", "Costa Rica"),
    ("Honduras", "Honduras"),
    ("El Salvador", "El Salvador"),
    ("Guatemala", "Guatemala"),
    ("Nicaragua", "Nicaragua"),
    ("Venezuela", "Venezuela"),
    ("República Dominicana", "República Dominicana"),
];

/// Institutional names that imply a country. Scanned after [`COUNTRIES`].
pub const ENTITY_HINTS: [(&str, &str); 7] = [
    ("Nación", "Argentina"),
    ("Nacion", "Argentina"),
    ("Buenos Aires", "Argentina"),
    ("CABA", "Argentina"),
    ("Provincia de", "Argentina"),
    ("Ministerio de Seguridad", "Argentina"),
    ("Banco Hipotecario", "Argentina"),
];

/// Whether a template header names a running-counter column.
///
/// Both the normalized header and the trimmed, lowercased raw header are
/// checked, so "No." and "#" qualify even though normalization strips them.
pub fn is_row_index(header: &str) -> bool {
    let raw = header.trim().to_lowercase();
    let normalized = normalize(header);
    ROW_INDEX_HEADERS.iter().any(|keyword| *keyword == normalized || *keyword == raw)
}

/// Whether a template header names a country column.
pub fn is_country(header: &str) -> bool {
    let normalized = normalize(header);
    COUNTRY_HEADERS.contains(&normalized.as_str())
}

/// Date-range classification of a template header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DateRole {
    pub start: bool,
    pub end: bool,
}

impl DateRole {
    /// Classifies a header by its normalized words.
    pub fn of(header: &str) -> Self {
        let words = words(header);
        DateRole {
            start: START_KEYWORDS.iter().any(|keyword| words.contains(*keyword)),
            end: END_KEYWORDS.iter().any(|keyword| words.contains(*keyword)),
        }
    }

    pub fn is_date(&self) -> bool {
        self.start || self.end
    }

    /// Score boost for a spreadsheet header, matched by substring on its normalized text.
    pub fn boost(&self, spreadsheet_header: &str, amount: f64) -> f64 {
        let normalized = normalize(spreadsheet_header);
        let contains_any = |keywords: &[&str]| keywords.iter().any(|keyword| normalized.contains(keyword));
        let mut boost = 0.0;
        if self.start && contains_any(&START_BOOST_KEYWORDS) {
            boost += amount;
        }
        if self.end && contains_any(&END_BOOST_KEYWORDS) {
            boost += amount;
        }
        boost
    }
}

/// Whether a spreadsheet header names the entity column.
pub fn is_entity_header(header: &str) -> bool {
    let normalized = normalize(header);
    ENTITY_HEADER_KEYWORDS.iter().any(|keyword| normalized.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_index_headers() {
        for header in ["No.", "no", " N ", "#", "Número", "NUMERO"] {
            assert!(is_row_index(header), "header {header:?}");
        }
        for header in ["Nombre", "No. de expediente", ""] {
            assert!(!is_row_index(header), "header {header:?}");
        }
    }

    #[test]
    fn country_headers() {
        assert!(is_country("País"));
        assert!(is_country("COUNTRY"));
        assert!(is_country("Países"));
        assert!(!is_country("País de origen"));
    }

    #[test]
    fn date_roles() {
        assert_eq!(DateRole::of("Fecha Desde"), DateRole { start: true, end: false });
        assert_eq!(DateRole::of("Fecha de fin"), DateRole { start: false, end: true });
        assert_eq!(DateRole::of("Vigencia desde / hasta"), DateRole { start: true, end: true });
        // whole words only on the template side
        assert!(!DateRole::of("Final").is_date());
    }

    #[test]
    fn date_boost_matches_substrings() {
        let start = DateRole::of("Inicio");
        assert_eq!(start.boost("Fecha Desde Convenio", 0.4), 0.4);
        assert_eq!(start.boost("Fecha Hasta Convenio", 0.4), 0.0);
        let end = DateRole::of("Hasta");
        assert_eq!(end.boost("Financiamiento", 0.4), 0.4);
        assert_eq!(DateRole::default().boost("Desde", 0.4), 0.0);
    }

    #[test]
    fn entity_headers() {
        assert!(is_entity_header("Entidad Contratante"));
        assert!(is_entity_header("CONTRATANTE"));
        assert!(!is_entity_header("Monto"));
    }
}
