//! Archived snapshot CSVs on local disk.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::error::Result;
use crate::table::Table;
use crate::types::{Snapshot, SnapshotSource};

static YEAR_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

/// Snapshot year from an archive filename stem: the last four characters
/// of the trailing `_`-separated token. Month-suffixed names
/// (`..._2024_12`) would yield the month under that rule alone, so values
/// that are not plausible years fall back to the last four-digit group
/// anywhere in the stem. Anything else is unparseable.
pub fn parse_snapshot_year(stem: &str) -> Option<i32> {
    let token = stem.rsplit('_').next().unwrap_or(stem);
    let chars: Vec<char> = token.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    if let Ok(year) = tail.parse::<i32>() {
        if year >= 1000 {
            return Some(year);
        }
    }
    YEAR_GROUP
        .find_iter(stem)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// Reads every `*.csv` under the archive directory, sorted by file name.
pub struct ArchiveSource {
    dir: PathBuf,
}

impl ArchiveSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn csv_paths(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read archive directory {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        paths
    }

    fn load_file(path: &Path) -> Result<Snapshot> {
        let table = Table::read_csv(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let year = parse_snapshot_year(&stem);
        if year.is_none() {
            warn!("Could not parse a snapshot year from '{}'", stem);
        }
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Snapshot { table, year, label })
    }
}

#[async_trait::async_trait]
impl SnapshotSource for ArchiveSource {
    fn source_name(&self) -> &'static str {
        "archive"
    }

    /// Load every archive file. A file that fails to read or parse is
    /// skipped with a warning; it never takes its siblings down.
    async fn fetch(&self) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        for path in self.csv_paths() {
            match Self::load_file(&path) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("Skipping archive file {}: {}", path.display(), e),
            }
        }
        info!(
            "Found {} archive files in {}",
            snapshots.len(),
            self.dir.display()
        );
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_year_token_parses() {
        assert_eq!(
            parse_snapshot_year("Skilled_Nursing_Facility_Provider_Data_2024"),
            Some(2024)
        );
        assert_eq!(parse_snapshot_year("data_02135"), Some(2135));
    }

    #[test]
    fn month_suffixed_stems_fall_back_to_the_year_group() {
        assert_eq!(parse_snapshot_year("fykj-qjee_2024_12"), Some(2024));
    }

    #[test]
    fn non_numeric_stems_yield_none() {
        assert_eq!(parse_snapshot_year("provider_data_latest"), None);
        assert_eq!(parse_snapshot_year(""), None);
    }

    #[tokio::test]
    async fn missing_directory_is_empty_not_fatal() {
        let source = ArchiveSource::new("/definitely/not/here");
        let snapshots = source.fetch().await.unwrap();
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn files_load_sorted_with_year_and_label_tags() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("provider_data_2023.csv"),
            "Provider Number\n1\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("provider_data_2022.csv"),
            "Provider Number\n2\n",
        )
        .unwrap();
        let source = ArchiveSource::new(dir.path());
        let snapshots = source.fetch().await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].year, Some(2022));
        assert_eq!(snapshots[0].label, "provider_data_2022.csv");
        assert_eq!(snapshots[1].year, Some(2023));
    }
}
