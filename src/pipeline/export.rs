//! CSV export of the two output tables.

use std::collections::HashMap;
use std::path::Path;

use crate::types::{FacilityKey, FacilityRow, FacilityTable, TrendRow, WideQualityTable};
use crate::error::Result;

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

/// Write the joined quality export: wide measure columns left-joined with
/// facility attributes on the key triple, composite last.
pub fn write_quality_export(
    quality: &WideQualityTable,
    facilities: &FacilityTable,
    path: &Path,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = vec![
        "provider_id".to_string(),
        "snapshot_year".to_string(),
        "snapshot_label".to_string(),
    ];
    header.extend(quality.measures.iter().map(|m| m.to_string()));
    header.extend(facilities.fields.iter().map(|f| f.to_string()));
    header.push("composite_raw".to_string());
    writer.write_record(&header)?;

    let by_key: HashMap<&FacilityKey, &FacilityRow> =
        facilities.rows.iter().map(|row| (&row.key, row)).collect();

    for row in &quality.rows {
        let mut record: Vec<String> = vec![
            row.key.provider_id.clone(),
            format_year(row.key.snapshot_year),
            row.key.snapshot_label.clone(),
        ];
        record.extend(row.scores.iter().map(|s| format_cell(*s)));
        match by_key.get(&row.key) {
            Some(facility) => record.extend(facility.values.iter().cloned()),
            None => record.extend(std::iter::repeat(String::new()).take(facilities.fields.len())),
        }
        record.push(format_cell(row.composite));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the trend summary export.
pub fn write_trend_export(trend: &[TrendRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "measure",
        "snapshot_year",
        "facilities",
        "avg_score",
        "median_score",
    ])?;
    for row in trend {
        writer.write_record([
            row.measure.clone(),
            row.snapshot_year.to_string(),
            row.facilities.to_string(),
            row.avg_score.to_string(),
            row.median_score.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WideRow;

    fn key(provider: &str, year: i32, label: &str) -> FacilityKey {
        FacilityKey {
            provider_id: provider.to_string(),
            snapshot_year: Some(year),
            snapshot_label: label.to_string(),
        }
    }

    #[test]
    fn join_is_exact_on_the_key_triple() {
        let quality = WideQualityTable {
            measures: vec!["Pressure Ulcer Rate"],
            rows: vec![
                WideRow {
                    key: key("1", 2024, "a.csv"),
                    scores: vec![Some(12.5)],
                    composite: Some(0.5),
                },
                WideRow {
                    key: key("1", 2024, "other.csv"),
                    scores: vec![Some(3.0)],
                    composite: Some(1.0),
                },
            ],
        };
        let facilities = FacilityTable {
            fields: vec!["facility_name"],
            rows: vec![FacilityRow {
                key: key("1", 2024, "a.csv"),
                values: vec!["Alpha Care".to_string()],
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quality.csv");
        write_quality_export(&quality, &facilities, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "provider_id,snapshot_year,snapshot_label,Pressure Ulcer Rate,facility_name,composite_raw"
        );
        assert_eq!(lines.next().unwrap(), "1,2024,a.csv,12.5,Alpha Care,0.5");
        // Same provider/year under a different label finds no attributes.
        assert_eq!(lines.next().unwrap(), "1,2024,other.csv,3,,1");
    }

    #[test]
    fn trend_export_has_the_documented_columns() {
        let trend = vec![TrendRow {
            measure: "Pressure Ulcer Rate".to_string(),
            snapshot_year: 2024,
            facilities: 2,
            avg_score: 3.0,
            median_score: 3.0,
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.csv");
        write_trend_export(&trend, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "measure,snapshot_year,facilities,avg_score,median_score\n\
             Pressure Ulcer Rate,2024,2,3,3\n"
        );
    }
}
