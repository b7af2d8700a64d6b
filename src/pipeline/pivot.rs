//! Long-to-wide reshape of measure rows.
//!
//! One input row per provider × measure × snapshot becomes one output row
//! per provider × snapshot with one column per recognized measure. Key
//! collisions resolve to the first non-missing score encountered in input
//! order; that tie-break is an explicit rule, not an accident of iteration.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::constants::{MEASURE_CATALOG, SNAPSHOT_LABEL_COL, SNAPSHOT_YEAR_COL};
use crate::pipeline::schema::{
    find_measure_code_column, find_provider_column, find_score_column,
};
use crate::table::{is_missing, Table};
use crate::types::{FacilityKey, WideQualityTable, WideRow};

/// Coerce a score cell to a finite numeric value; anything else is missing.
fn parse_score(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn parse_year(cell: &str) -> Option<i32> {
    cell.trim().parse::<i32>().ok()
}

/// Pivot the filtered long table into a [`WideQualityTable`]. Returns an
/// empty table (and logs) when any of the measure/provider/score columns
/// cannot be located; the caller continues with what it has.
pub fn pivot_measures(table: &Table) -> WideQualityTable {
    let (measure_col, provider_col, score_col) = match (
        find_measure_code_column(table),
        find_provider_column(table),
        find_score_column(table),
    ) {
        (Some(m), Some(p), Some(s)) => (m, p, s),
        _ => {
            warn!("Could not locate measure/provider/score columns");
            return WideQualityTable::default();
        }
    };
    let year_col = table.column_index(SNAPSHOT_YEAR_COL);
    let label_col = table.column_index(SNAPSHOT_LABEL_COL);

    let mut cells: HashMap<(FacilityKey, &'static str), f64> = HashMap::new();
    let mut present_codes: BTreeSet<&'static str> = BTreeSet::new();
    let mut keys: BTreeSet<FacilityKey> = BTreeSet::new();

    for row in table.rows() {
        let raw_code = row[measure_col].as_str();
        let Some(&(code, _)) = MEASURE_CATALOG.iter().find(|(c, _)| *c == raw_code) else {
            continue;
        };
        let Some(score) = parse_score(&row[score_col]) else {
            continue;
        };
        if is_missing(&row[provider_col]) {
            continue;
        }
        let key = FacilityKey {
            provider_id: row[provider_col].clone(),
            snapshot_year: year_col.and_then(|idx| parse_year(&row[idx])),
            snapshot_label: label_col.map(|idx| row[idx].clone()).unwrap_or_default(),
        };
        // First non-missing score wins on key collision.
        cells.entry((key.clone(), code)).or_insert(score);
        present_codes.insert(code);
        keys.insert(key);
    }

    let codes: Vec<&'static str> = MEASURE_CATALOG
        .iter()
        .filter(|(code, _)| present_codes.contains(code))
        .map(|(code, _)| *code)
        .collect();
    let measures: Vec<&'static str> = MEASURE_CATALOG
        .iter()
        .filter(|(code, _)| present_codes.contains(code))
        .map(|(_, label)| *label)
        .collect();

    let rows = keys
        .into_iter()
        .map(|key| {
            let scores = codes
                .iter()
                .map(|&code| cells.get(&(key.clone(), code)).copied())
                .collect();
            WideRow {
                key,
                scores,
                composite: None,
            }
        })
        .collect();

    WideQualityTable { measures, rows }
}
