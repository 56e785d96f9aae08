//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Import engine configuration
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// CSV field delimiter
    pub csv_delimiter: u8,

    /// Artificial delay between committed rows, in milliseconds
    pub commit_delay_ms: u64,

    /// Where the import run history is persisted
    pub history_file: PathBuf,
}

impl ImportConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let delimiter = std::env::var("IMPORT_CSV_DELIMITER").unwrap_or_else(|_| ",".to_string());
        if delimiter.len() != 1 || !delimiter.is_ascii() {
            anyhow::bail!(
                "IMPORT_CSV_DELIMITER must be a single ASCII character (current: {:?})",
                delimiter
            );
        }
        let csv_delimiter = delimiter.as_bytes()[0];

        let commit_delay_ms = std::env::var("IMPORT_COMMIT_DELAY_MS")
            .unwrap_or_else(|_| "150".to_string())
            .parse::<u64>()
            .context("IMPORT_COMMIT_DELAY_MS must be a non-negative integer")?;

        let history_file = std::env::var("IMPORT_HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs/import-history.json"));

        Ok(Self {
            csv_delimiter,
            commit_delay_ms,
            history_file,
        })
    }

    /// Pacing delay as a `Duration`
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: b',',
            commit_delay_ms: 150,
            history_file: PathBuf::from("logs/import-history.json"),
        }
    }
}
