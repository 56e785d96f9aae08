//! Persistence collaborators
//!
//! The commit engine talks to storage through `EntityWriter`; the host
//! application implements it against its own repository. `JsonlWriter` is
//! the crate's reference implementation, appending one JSON line per
//! committed record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

/// Creates one persisted entity per eligible row. A failure is caught by
/// the commit engine and becomes a row-level error, never a pipeline abort.
#[async_trait]
pub trait EntityWriter<R>: Send + Sync {
    async fn create(&self, record: &R) -> Result<()>;
}

/// Appends committed records as JSON lines to a file
pub struct JsonlWriter {
    path: PathBuf,
}

impl JsonlWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl<R> EntityWriter<R> for JsonlWriter
where
    R: Serialize + Send + Sync,
{
    async fn create(&self, record: &R) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("no se pudo abrir {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }
}
