//! Greedy template-to-spreadsheet column assignment.

use crate::config::InferenceConfig;
use crate::document::TemplateColumn;
use crate::mapping::keywords::is_country;
use crate::mapping::keywords::is_entity_header;
use crate::mapping::keywords::is_row_index;
use crate::mapping::keywords::DateRole;
use crate::mapping::text::overlap;
use crate::mapping::ColumnMapping;
use crate::mapping::Source;
use crate::mapping::ValueFormat;
use crate::spreadsheet::HeaderMap;
use std::collections::HashSet;
use tracing::debug;

/// Infers a mapping with the default thresholds, see [`infer_mapping_with`].
pub fn infer_mapping(columns: &[TemplateColumn], headers: &HeaderMap) -> Vec<ColumnMapping> {
    infer_mapping_with(columns, headers, &InferenceConfig::default())
}

/// Assigns a source to every template column, in template order.
///
/// Counter and country columns get synthetic sources. Every other column takes
/// the best-scoring spreadsheet column not taken by an earlier template column,
/// provided the score exceeds `config.threshold`; ties go to the leftmost
/// spreadsheet column. Date-range columns always carry the short-date format,
/// mapped or not.
///
/// # Arguments
///
/// * `columns` - Template columns, left to right
/// * `headers` - Spreadsheet headers in ascending column order
/// * `config` - Threshold, date boost and fallback entity column
///
/// # Returns
///
/// One mapping per template column, in the same order. Never fails; a column
/// without a match gets [`Source::Unmapped`].
pub fn infer_mapping_with(
    columns: &[TemplateColumn],
    headers: &HeaderMap,
    config: &InferenceConfig,
) -> Vec<ColumnMapping> {
    let mut used = HashSet::new();
    columns.iter()
        .map(|column| {
            let (source, format) = infer_source(&column.header, headers, config, &mut used);
            debug!(header = %column.header, %source, ?format, "inferred column source");
            ColumnMapping::from_template(column, source, format)
        })
        .collect()
}

fn infer_source<'h>(
    header: &str,
    headers: &'h HeaderMap,
    config: &InferenceConfig,
    used: &mut HashSet<&'h str>,
) -> (Source, Option<ValueFormat>) {
    if is_row_index(header) {
        return (Source::AutoIncrement, None);
    }
    if is_country(header) {
        let from_col = entity_column(headers, &config.fallback_country_column);
        return (Source::ExtractCountry { from_col: Some(from_col) }, None);
    }

    let role = DateRole::of(header);
    let mut best: Option<&str> = None;
    let mut best_score = 0.0;
    for (letter, spreadsheet_header) in headers.iter() {
        if used.contains(letter) {
            continue;
        }
        let score = overlap(header, spreadsheet_header) + role.boost(spreadsheet_header, config.date_boost);
        if score > best_score {
            best_score = score;
            best = Some(letter);
        }
    }

    let format = role.is_date().then_some(ValueFormat::ShortDate);
    match best {
        Some(letter) if best_score > config.threshold => {
            used.insert(letter);
            (Source::Column { letter: letter.to_owned() }, format)
        }
        _ => (Source::Unmapped, format),
    }
}

/// Letter of the first spreadsheet column whose header mentions the contracting
/// entity, or `fallback` when none does.
pub fn entity_column(headers: &HeaderMap, fallback: &str) -> String {
    headers.iter()
        .find(|(_, header)| is_entity_header(header))
        .map(|(letter, _)| letter.to_owned())
        .unwrap_or_else(|| fallback.to_owned())
}
