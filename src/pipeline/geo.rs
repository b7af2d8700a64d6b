//! County/state normalization and allow-list filtering.
//!
//! Normalization must be applied identically to the allow-list and to the
//! data columns; both paths go through [`normalize_county`] and
//! [`normalize_state`]. If either side normalizes differently the filter
//! degrades to zero matching rows without raising.

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::constants::{COUNTY_FILTER_HEADERS, STATE_FILTER_HEADERS};
use crate::error::{PipelineError, Result};
use crate::table::{is_missing, Table};

/// Uppercase, trim and strip a trailing county-type suffix.
pub fn normalize_county(raw: &str) -> String {
    let mut value = raw.trim().to_uppercase();
    for suffix in [" COUNTY", " PARISH"] {
        if let Some(stripped) = value.strip_suffix(suffix) {
            value = stripped.to_string();
        }
    }
    value
}

pub fn normalize_state(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Caller-supplied set of (county, state) pairs to retain, normalized on
/// load.
#[derive(Debug, Clone, Default)]
pub struct CountyAllowList {
    allowed: HashSet<(String, String)>,
}

impl CountyAllowList {
    /// Load from a CSV with `County` and `StateCode` columns (header
    /// whitespace tolerated).
    pub fn load(path: &Path) -> Result<Self> {
        let table = Table::read_csv(path)?;
        let county_col = table
            .find_column(|h| h.trim() == "County")
            .ok_or_else(|| PipelineError::MissingColumn("County".to_string()))?;
        let state_col = table
            .find_column(|h| h.trim() == "StateCode")
            .ok_or_else(|| PipelineError::MissingColumn("StateCode".to_string()))?;

        let allowed = table
            .rows()
            .iter()
            .map(|row| {
                (
                    normalize_county(&row[county_col]),
                    normalize_state(&row[state_col]),
                )
            })
            .collect();
        Ok(Self { allowed })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        Self {
            allowed: pairs
                .into_iter()
                .map(|(county, state)| {
                    (normalize_county(county.as_ref()), normalize_state(state.as_ref()))
                })
                .collect(),
        }
    }

    pub fn contains(&self, county: &str, state: &str) -> bool {
        self.allowed
            .contains(&(county.to_string(), state.to_string()))
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// Restrict the unified table to rows whose normalized (county, state)
/// appears in the allow-list. When no county-like or state-like column
/// exists the full table passes through unchanged; the safety valve is
/// logged, not silent.
pub fn filter_to_counties(table: &Table, allow: &CountyAllowList) -> Table {
    let county_cols = table.find_columns(|h| {
        COUNTY_FILTER_HEADERS.contains(&h.to_lowercase().as_str())
    });
    let state_cols =
        table.find_columns(|h| STATE_FILTER_HEADERS.contains(&h.to_lowercase().as_str()));

    if county_cols.is_empty() || state_cols.is_empty() {
        warn!("No county/state columns found; skipping geographic filter");
        return table.clone();
    }

    table.filter_rows(|row| {
        let county = normalize_county(coalesce(row, &county_cols));
        let state = normalize_state(coalesce(row, &state_cols));
        allow.contains(&county, &state)
    })
}

/// First non-missing value across the candidate columns, left to right.
fn coalesce<'a>(row: &'a [String], cols: &[usize]) -> &'a str {
    cols.iter()
        .map(|&idx| row[idx].as_str())
        .find(|value| !is_missing(value))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::from_csv_str(
            "County Name,Provider State,Score\n\
             Sullivan County,TN,1\n\
             Washington County,TN,2\n\
             Sullivan Parish,LA,3\n",
        )
        .unwrap()
    }

    #[test]
    fn suffixed_county_matches_normalized_entry() {
        let allow = CountyAllowList::from_pairs([("SULLIVAN", "TN")]);
        let filtered = filter_to_counties(&sample_table(), &allow);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows()[0][0], "Sullivan County");
    }

    #[test]
    fn rows_outside_allow_list_are_excluded() {
        let allow = CountyAllowList::from_pairs([("WASHINGTON", "TN")]);
        let filtered = filter_to_counties(&sample_table(), &allow);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows()[0][2], "2");
    }

    #[test]
    fn filtering_is_idempotent() {
        let allow = CountyAllowList::from_pairs([("SULLIVAN", "TN"), ("WASHINGTON", "TN")]);
        let once = filter_to_counties(&sample_table(), &allow);
        let twice = filter_to_counties(&once, &allow);
        assert_eq!(once.rows(), twice.rows());
    }

    #[test]
    fn divergent_normalization_degrades_to_zero_rows() {
        // "SULLIVAN CO." is not a recognized suffix, so it never matches the
        // data side; the filter returns empty rather than raising.
        let allow = CountyAllowList::from_pairs([("SULLIVAN CO.", "TN")]);
        let filtered = filter_to_counties(&sample_table(), &allow);
        assert!(filtered.is_empty());
    }

    #[test]
    fn missing_geo_columns_pass_table_through() {
        let table = Table::from_csv_str("Provider Name,Score\nAlpha,1\n").unwrap();
        let allow = CountyAllowList::from_pairs([("SULLIVAN", "TN")]);
        let filtered = filter_to_counties(&table, &allow);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn candidate_columns_coalesce_left_to_right() {
        let table = Table::from_csv_str(
            "County Name,County,Provider State\n\
             ,Sullivan,TN\n",
        )
        .unwrap();
        let allow = CountyAllowList::from_pairs([("SULLIVAN", "TN")]);
        let filtered = filter_to_counties(&table, &allow);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn parish_suffix_is_stripped() {
        assert_eq!(normalize_county(" st. landry parish "), "ST. LANDRY");
        assert_eq!(normalize_county("Sullivan County"), "SULLIVAN");
        assert_eq!(normalize_county("SULLIVAN"), "SULLIVAN");
    }
}
