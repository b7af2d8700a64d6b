use crate::error::Result;
use crate::table::Table;

/// One dated extract of the source dataset, tagged on ingestion.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Table,
    /// Parsed from the archive filename; `None` when the token is
    /// unparseable.
    pub year: Option<i32>,
    /// Source file name (or `current_api` for the live pull); unique per
    /// snapshot.
    pub label: String,
}

/// The dedup/join key used throughout the pipeline. `provider_id` alone is
/// not unique: the same facility reappears across years, and the same year
/// may carry multiple snapshot labels (archived vs. live-pulled).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityKey {
    pub provider_id: String,
    pub snapshot_year: Option<i32>,
    pub snapshot_label: String,
}

/// Wide table: one row per [`FacilityKey`], one column per measure label
/// actually present in the data (ordered by measure code).
#[derive(Debug, Clone, Default)]
pub struct WideQualityTable {
    pub measures: Vec<&'static str>,
    pub rows: Vec<WideRow>,
}

#[derive(Debug, Clone)]
pub struct WideRow {
    pub key: FacilityKey,
    /// Parallel to `WideQualityTable::measures`.
    pub scores: Vec<Option<f64>>,
    /// Appended by the composite scorer.
    pub composite: Option<f64>,
}

/// Per-(provider, year) descriptive attributes, deduplicated with
/// first-occurrence-wins.
#[derive(Debug, Clone, Default)]
pub struct FacilityTable {
    /// Canonical names of the descriptive fields resolved for this run,
    /// excluding the key columns.
    pub fields: Vec<&'static str>,
    pub rows: Vec<FacilityRow>,
}

#[derive(Debug, Clone)]
pub struct FacilityRow {
    pub key: FacilityKey,
    /// Parallel to `FacilityTable::fields`; empty string when absent.
    pub values: Vec<String>,
}

/// One (measure, year) aggregate for the trend summary export.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRow {
    pub measure: String,
    pub snapshot_year: i32,
    /// Count of distinct providers with a score for this measure/year.
    pub facilities: usize,
    pub avg_score: f64,
    pub median_score: f64,
}

/// Core trait all snapshot sources implement.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Unique identifier for this source.
    fn source_name(&self) -> &'static str;

    /// Fetch all snapshots this source can provide.
    async fn fetch(&self) -> Result<Vec<Snapshot>>;
}
