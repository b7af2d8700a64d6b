//! The current CMS snapshot, pulled through the provider-data metastore.

use std::time::Duration;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::constants::{LIVE_SNAPSHOT_LABEL, METASTORE_URL};
use crate::error::{PipelineError, Result};
use crate::table::Table;
use crate::types::{Snapshot, SnapshotSource};

/// Dataset descriptor returned by the metastore; only the download URL of
/// the first distribution matters here.
#[derive(Debug, Deserialize)]
struct DatasetDescriptor {
    #[serde(default)]
    distribution: Vec<Distribution>,
}

#[derive(Debug, Deserialize)]
struct Distribution {
    data: DistributionData,
}

#[derive(Debug, Deserialize)]
struct DistributionData {
    #[serde(rename = "downloadURL")]
    download_url: String,
}

pub struct LiveSource {
    dataset_id: String,
    timeout: Duration,
}

impl LiveSource {
    pub fn new(dataset_id: &str, timeout_seconds: u64) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotSource for LiveSource {
    fn source_name(&self) -> &'static str {
        "live_api"
    }

    /// Metadata lookup, then CSV download from the nested URL. Tagged with
    /// the current year and the `current_api` label.
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<Snapshot>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let meta_url = format!(
            "{}/{}?show-reference-ids=true",
            METASTORE_URL, self.dataset_id
        );
        info!("Fetching dataset metadata from {}", meta_url);
        let descriptor: DatasetDescriptor = client
            .get(&meta_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let download_url = descriptor
            .distribution
            .first()
            .map(|d| d.data.download_url.clone())
            .ok_or_else(|| {
                PipelineError::MissingField("distribution download URL".to_string())
            })?;

        info!("Downloading current snapshot from {}", download_url);
        let bytes = client
            .get(&download_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let table = Table::from_csv_bytes(&bytes)?;
        info!("Pulled current snapshot: {} rows", table.len());

        Ok(vec![Snapshot {
            table,
            year: Some(Utc::now().year()),
            label: LIVE_SNAPSHOT_LABEL.to_string(),
        }])
    }
}
