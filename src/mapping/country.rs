//! Country extraction from free-text entity names.

use crate::mapping::keywords::COUNTRIES;
use crate::mapping::keywords::ENTITY_HINTS;

/// Returns the canonical country named or implied by `text`, or an empty string.
///
/// Country names are tried first, then institutional hints, each table in order;
/// the first keyword contained in `text` wins. Matching is case-sensitive
/// substring containment, so a keyword embedded in an unrelated word also matches.
pub fn extract_country(text: &str) -> String {
    COUNTRIES.iter()
        .chain(ENTITY_HINTS.iter())
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, country)| (*country).to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_entity_hint() {
        assert_eq!(extract_country("Ministerio de Seguridad de la Nación"), "Argentina");
    }

    #[test]
    fn extracts_country_name() {
        assert_eq!(extract_country("Gobierno de Chile"), "Chile");
    }

    #[test]
    fn unrelated_text_yields_empty() {
        assert_eq!(extract_country("Unrelated text"), "");
        assert_eq!(extract_country(""), "");
    }

    #[test]
    fn variants_collapse_to_canonical_spelling() {
        assert_eq!(extract_country("Municipalidad de Lima, Peru"), "Perú");
        assert_eq!(extract_country("Gobierno de Mexico"), "México");
        assert_eq!(extract_country("Canal de Panama"), "Panamá");
    }

    #[test]
    fn country_names_win_over_hints() {
        // "Nación" is a hint, "Colombia" a country name
        assert_eq!(extract_country("Banco de la Nación de Colombia"), "Colombia");
    }

    #[test]
    fn first_table_entry_wins() {
        assert_eq!(extract_country("Acuerdo Chile - Argentina"), "Argentina");
    }

    #[test]
    fn matching_is_case_sensitive_substring() {
        assert_eq!(extract_country("CHILE"), "");
        assert_eq!(extract_country("Provincia de Mendoza"), "Argentina");
        assert_eq!(extract_country("Panamericana S.A."), "");
        assert_eq!(extract_country("Transpanamax Chilean Line"), "Chile");
    }
}
