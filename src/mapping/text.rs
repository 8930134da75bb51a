//! Header text normalization and word-overlap similarity.

use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical comparison key of a header.
///
/// Lowercases, decomposes accented characters and drops the combining marks,
/// replaces every character outside `[a-z0-9 ]` with a space, then trims.
///
/// ```
/// assert_eq!(exp_table::mapping::normalize("  País / Año "), "pais   ano");
/// ```
pub fn normalize(text: &str) -> String {
    let folded: String = text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' { c } else { ' ' })
        .collect();
    folded.trim().to_owned()
}

/// Distinct words of a normalized header.
pub(crate) fn words(text: &str) -> HashSet<String> {
    normalize(text).split_whitespace().map(str::to_owned).collect()
}

/// Shared words over the word count of the larger header, in `[0, 1]`.
///
/// Returns 0 when either header has no words.
pub fn overlap(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / a.len().max(b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [&str; 8] = [
        "País",
        "Fecha Desde Convenio",
        "  N° de Expediente ",
        "No.",
        "#",
        "",
        "ÁÉÍÓÚ ñ ü Ç",
        "Año\t2024 / Período",
    ];

    #[test]
    fn normalize_strips_accents_and_punctuation() {
        assert_eq!(normalize("País"), "pais");
        assert_eq!(normalize("No."), "no");
        assert_eq!(normalize("#"), "");
        assert_eq!(normalize("ÁÉÍÓÚ ñ ü Ç"), "aeiou n u c");
        assert_eq!(normalize("Fecha\tDesde"), "fecha desde");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for sample in SAMPLES {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn overlap_is_symmetric() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(overlap(a, b), overlap(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn overlap_with_itself_is_one() {
        for sample in SAMPLES {
            if !normalize(sample).is_empty() {
                assert_eq!(overlap(sample, sample), 1.0, "sample {sample:?}");
            }
        }
    }

    #[test]
    fn overlap_counts_shared_words() {
        assert_eq!(overlap("Fecha Desde", "Fecha Desde Convenio"), 2.0 / 3.0);
        assert_eq!(overlap("fecha fecha", "FECHA"), 1.0);
        assert_eq!(overlap("Entidad", "Monto"), 0.0);
        assert_eq!(overlap("#", "#"), 0.0);
    }
}
