//! Per-provider descriptive attributes, deduplicated per snapshot year.

use std::collections::HashSet;

use tracing::warn;

use crate::constants::{FACILITY_FIELDS, SNAPSHOT_LABEL_COL, SNAPSHOT_YEAR_COL};
use crate::pipeline::schema::resolve_columns;
use crate::table::Table;
use crate::types::{FacilityKey, FacilityRow, FacilityTable};

/// Extract one attributes row per `(provider_id, snapshot_year)`, keeping
/// the first occurrence in input order. Returns an empty table (and logs)
/// when no provider-id-equivalent column exists; only this derivation
/// stops, not the run.
pub fn build_facility_table(table: &Table) -> FacilityTable {
    let columns = resolve_columns(table, FACILITY_FIELDS);
    let Some(provider_col) = columns.get("provider_id") else {
        warn!("Provider/CCN column not found");
        return FacilityTable::default();
    };
    let year_col = table.column_index(SNAPSHOT_YEAR_COL);
    let label_col = table.column_index(SNAPSHOT_LABEL_COL);

    let descriptive: Vec<(&'static str, usize)> = columns
        .fields()
        .filter(|(name, _)| *name != "provider_id")
        .collect();

    let mut seen: HashSet<(String, Option<i32>)> = HashSet::new();
    let mut rows = Vec::new();
    for row in table.rows() {
        let provider_id = row[provider_col].clone();
        let snapshot_year = year_col.and_then(|idx| row[idx].trim().parse::<i32>().ok());
        if !seen.insert((provider_id.clone(), snapshot_year)) {
            continue;
        }
        rows.push(FacilityRow {
            key: FacilityKey {
                provider_id,
                snapshot_year,
                snapshot_label: label_col.map(|idx| row[idx].clone()).unwrap_or_default(),
            },
            values: descriptive.iter().map(|(_, idx)| row[*idx].clone()).collect(),
        });
    }

    FacilityTable {
        fields: descriptive.iter().map(|(name, _)| *name).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_provider_year_keeps_first_occurrence() {
        let table = Table::from_csv_str(
            "CMS Certification Number (CCN),Provider Name,snapshot_year,snapshot_label\n\
             445078,First Name,2024,a.csv\n\
             445078,Second Name,2024,a.csv\n\
             445078,Third Name,2023,b.csv\n",
        )
        .unwrap();
        let facilities = build_facility_table(&table);
        assert_eq!(facilities.rows.len(), 2);
        assert_eq!(facilities.rows[0].values[0], "First Name");
        assert_eq!(facilities.rows[1].key.snapshot_year, Some(2023));
    }

    #[test]
    fn key_triple_is_unique_in_output() {
        let table = Table::from_csv_str(
            "Provider Number,snapshot_year,snapshot_label\n\
             1,2023,a.csv\n\
             2,2023,a.csv\n\
             1,2024,b.csv\n\
             1,2023,a.csv\n",
        )
        .unwrap();
        let facilities = build_facility_table(&table);
        let keys: HashSet<_> = facilities.rows.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys.len(), facilities.rows.len());
    }

    #[test]
    fn absent_fields_are_simply_omitted() {
        let table = Table::from_csv_str(
            "Federal Provider Number,City/Town,snapshot_year,snapshot_label\n\
             445078,Bristol,2024,a.csv\n",
        )
        .unwrap();
        let facilities = build_facility_table(&table);
        assert_eq!(facilities.fields, vec!["city"]);
        assert_eq!(facilities.rows[0].values, vec!["Bristol"]);
    }

    #[test]
    fn missing_provider_column_yields_empty_table() {
        let table = Table::from_csv_str("Facility Thing,snapshot_year\nX,2024\n").unwrap();
        let facilities = build_facility_table(&table);
        assert!(facilities.rows.is_empty());
        assert!(facilities.fields.is_empty());
    }
}
