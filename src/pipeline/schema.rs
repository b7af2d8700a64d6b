//! Header reconciliation across snapshot vintages.
//!
//! Every canonical field carries an ordered candidate list of known header
//! spellings ([`crate::constants::FACILITY_FIELDS`]); the first spelling
//! present in a table's actual headers wins. Matching is exact and
//! case-sensitive: a vintage that ships a spelling outside the list
//! silently loses that field rather than erroring. The pivot columns get a
//! documented substring fallback on top of their exact spelling.

use crate::constants::{
    FieldSpec, MEASURE_CODE_HEADER, PROVIDER_CCN_HEADER, SCORE_HEADER,
};
use crate::table::Table;

/// Canonical field name -> resolved column index for one table.
#[derive(Debug, Default)]
pub struct ColumnMap {
    entries: Vec<(&'static str, usize)>,
}

impl ColumnMap {
    pub fn get(&self, field: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, idx)| *idx)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.entries.iter().copied()
    }
}

/// Resolve each canonical field against the table headers: first candidate
/// spelling present wins; fields with no matching candidate are absent from
/// the map.
pub fn resolve_columns(table: &Table, fields: &[FieldSpec]) -> ColumnMap {
    let mut entries = Vec::new();
    for spec in fields {
        if let Some(idx) = spec
            .candidates
            .iter()
            .find_map(|candidate| table.column_index(candidate))
        {
            entries.push((spec.name, idx));
        }
    }
    ColumnMap { entries }
}

/// Exact `Measure Code`, else any header containing both "measure" and
/// "code" (case-insensitive).
pub fn find_measure_code_column(table: &Table) -> Option<usize> {
    table.column_index(MEASURE_CODE_HEADER).or_else(|| {
        table.find_column(|h| {
            let lower = h.to_lowercase();
            lower.contains("measure") && lower.contains("code")
        })
    })
}

/// Exact CCN header, else any header containing both "provider" and
/// "number" (case-insensitive).
pub fn find_provider_column(table: &Table) -> Option<usize> {
    table.column_index(PROVIDER_CCN_HEADER).or_else(|| {
        table.find_column(|h| {
            let lower = h.to_lowercase();
            lower.contains("provider") && lower.contains("number")
        })
    })
}

/// Exact `Score`, else any header equal to "score" ignoring case.
pub fn find_score_column(table: &Table) -> Option<usize> {
    table
        .column_index(SCORE_HEADER)
        .or_else(|| table.find_column(|h| h.eq_ignore_ascii_case("score")))
}
