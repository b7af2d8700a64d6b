use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::DATASET_ID;
use crate::error::{PipelineError, Result};
use crate::pipeline::composite::MissingPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub composite: CompositeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub id: String,
    pub timeout_seconds: u64,
    /// `YYYY_MM` tokens the `fetch` subcommand downloads.
    pub archive_months: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            id: DATASET_ID.to_string(),
            timeout_seconds: 60,
            archive_months: vec![
                "2024_12".to_string(),
                "2023_12".to_string(),
                "2022_12".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    pub missing_policy: MissingPolicy,
}

impl Config {
    /// Load `config.toml` when present; otherwise the compiled defaults.
    pub fn load_or_default() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.dataset.id, DATASET_ID);
        assert_eq!(config.dataset.timeout_seconds, 60);
        assert_eq!(config.composite.missing_policy, MissingPolicy::MostFavorable);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config: Config = toml::from_str(
            "[composite]\nmissing_policy = \"exclude\"\n",
        )
        .unwrap();
        assert_eq!(config.composite.missing_policy, MissingPolicy::Exclude);
        assert_eq!(config.dataset.id, DATASET_ID);
    }
}
