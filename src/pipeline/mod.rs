//! The batch pipeline: load, filter, reshape, score, summarize, export.

pub mod composite;
pub mod export;
pub mod facility;
pub mod geo;
pub mod pivot;
pub mod schema;
pub mod trend;

use std::fs;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::constants::{QUALITY_EXPORT, SNAPSHOT_LABEL_COL, SNAPSHOT_YEAR_COL, TREND_EXPORT};
use crate::error::{PipelineError, Result};
use crate::sources::archive::ArchiveSource;
use crate::sources::live::LiveSource;
use crate::table::Table;
use crate::types::{Snapshot, SnapshotSource};

/// Options for one pipeline run, mirroring the CLI surface.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub county_csv: PathBuf,
    pub archive_dir: PathBuf,
    pub output_dir: PathBuf,
    pub include_live: bool,
}

/// Result of a complete pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    pub snapshots: usize,
    pub rows_unified: usize,
    pub rows_filtered: usize,
    pub quality_rows: usize,
    pub facility_rows: usize,
    pub trend_rows: usize,
    pub quality_export: PathBuf,
    pub trend_export: PathBuf,
}

/// Tag every snapshot table with its year/label and concatenate, aligning
/// columns by header name across vintages.
fn unify_snapshots(snapshots: Vec<Snapshot>) -> Table {
    let tagged: Vec<Table> = snapshots
        .into_iter()
        .map(|snapshot| {
            let Snapshot {
                mut table,
                year,
                label,
            } = snapshot;
            let row_count = table.len();
            let year_cell = year.map(|y| y.to_string()).unwrap_or_default();
            table.push_column(SNAPSHOT_YEAR_COL, vec![year_cell; row_count]);
            table.push_column(SNAPSHOT_LABEL_COL, vec![label; row_count]);
            table
        })
        .collect();
    Table::concat(tagged)
}

/// Run the full pipeline. The only fatal condition is zero loadable source
/// tables; every per-source and per-derivation failure degrades the output
/// instead of aborting the run.
#[instrument(skip(options, config))]
pub async fn run(options: &RunOptions, config: &Config) -> Result<RunSummary> {
    let allow = geo::CountyAllowList::load(&options.county_csv)?;
    info!("Loaded {} county allow-list entries", allow.len());

    let mut sources: Vec<Box<dyn SnapshotSource>> =
        vec![Box::new(ArchiveSource::new(&options.archive_dir))];
    if options.include_live {
        sources.push(Box::new(LiveSource::new(
            &config.dataset.id,
            config.dataset.timeout_seconds,
        )));
    }

    let mut snapshots: Vec<Snapshot> = Vec::new();
    for source in &sources {
        match source.fetch().await {
            Ok(batch) => snapshots.extend(batch),
            Err(e) => warn!("{} source failed: {}", source.source_name(), e),
        }
    }
    if snapshots.is_empty() {
        return Err(PipelineError::NoData);
    }
    let snapshot_count = snapshots.len();

    let unified = unify_snapshots(snapshots);
    info!("Unified {} rows across {} snapshots", unified.len(), snapshot_count);

    let filtered = geo::filter_to_counties(&unified, &allow);
    info!("Rows after county filter: {}", filtered.len());

    let facilities = facility::build_facility_table(&filtered);
    let mut quality = pivot::pivot_measures(&filtered);
    info!(
        "Pivoted {} facility-year rows across {} measures",
        quality.rows.len(),
        quality.measures.len()
    );

    composite::score_composite(&mut quality, config.composite.missing_policy);
    let trend = trend::summarize_trends(&quality);

    fs::create_dir_all(&options.output_dir)?;
    let quality_path = options.output_dir.join(QUALITY_EXPORT);
    export::write_quality_export(&quality, &facilities, &quality_path)?;
    let trend_path = options.output_dir.join(TREND_EXPORT);
    export::write_trend_export(&trend, &trend_path)?;
    info!(
        "Exports written to {} and {}",
        quality_path.display(),
        trend_path.display()
    );

    Ok(RunSummary {
        snapshots: snapshot_count,
        rows_unified: unified.len(),
        rows_filtered: filtered.len(),
        quality_rows: quality.rows.len(),
        facility_rows: facilities.rows.len(),
        trend_rows: trend.len(),
        quality_export: quality_path,
        trend_export: trend_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_tags_and_aligns_vintages() {
        let a = Table::from_csv_str("Provider Number,County Name\n1,Sullivan\n").unwrap();
        let b = Table::from_csv_str("Provider Number,County/Parish\n2,Washington\n").unwrap();
        let unified = unify_snapshots(vec![
            Snapshot {
                table: a,
                year: Some(2023),
                label: "a.csv".to_string(),
            },
            Snapshot {
                table: b,
                year: None,
                label: "b.csv".to_string(),
            },
        ]);
        assert_eq!(unified.len(), 2);
        let year_col = unified.column_index(SNAPSHOT_YEAR_COL).unwrap();
        let label_col = unified.column_index(SNAPSHOT_LABEL_COL).unwrap();
        assert_eq!(unified.rows()[0][year_col], "2023");
        assert_eq!(unified.rows()[1][year_col], "");
        assert_eq!(unified.rows()[1][label_col], "b.csv");
        // Vintage-specific county spellings stay separate columns.
        assert!(unified.column_index("County Name").is_some());
        assert!(unified.column_index("County/Parish").is_some());
    }
}
