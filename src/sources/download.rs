//! Downloader for archived monthly snapshot CSVs.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::DatasetConfig;
use crate::constants::ARCHIVE_BASE_URL;
use crate::error::Result;

/// Download each configured `YYYY_MM` snapshot into the archive directory,
/// skipping files already on disk. Per-file failures are logged and the
/// loop continues. Returns how many of the configured files are present
/// afterwards.
pub async fn fetch_archives(dataset: &DatasetConfig, archive_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(archive_dir)?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(dataset.timeout_seconds))
        .build()?;

    let mut present = 0_usize;
    for month in &dataset.archive_months {
        let file_name = format!("{}_{}.csv", dataset.id, month);
        let dest = archive_dir.join(&file_name);
        if dest.exists() {
            info!("Skipping existing {}", dest.display());
            println!("… skipping existing {}", dest.display());
            present += 1;
            continue;
        }

        let url = format!("{}/{}", ARCHIVE_BASE_URL, file_name);
        match download_file(&client, &url, &dest).await {
            Ok(()) => {
                println!("✓ downloaded {}", dest.display());
                present += 1;
            }
            Err(e) => {
                warn!("{} -> {}", url, e);
                println!("❌ {} -> {}", url, e);
            }
        }
    }
    Ok(present)
}

async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    std::fs::write(dest, &bytes)?;
    Ok(())
}
