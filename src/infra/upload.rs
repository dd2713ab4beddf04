use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::parser::parse_records;
use crate::record::RawRecord;
use crate::services::record_source::{DataOrigin, RecordSource};

/// A user-supplied CSV (optionally gzip-compressed) on the local disk.
pub struct UploadSource {
    path: PathBuf,
}

impl UploadSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RecordSource for UploadSource {
    fn origin(&self) -> DataOrigin {
        DataOrigin::Upload {
            path: self.path.display().to_string(),
        }
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_raw(&self) -> Result<Vec<RawRecord>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        debug!(bytes = bytes.len(), "Upload read, parsing");

        let records = parse_records(&bytes)
            .with_context(|| format!("{} is not a usable 311 CSV", self.path.display()))?;
        Ok(records)
    }
}
