//! Trait and types for loading complaint datasets.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analyzers::{DerivedPolicy, NormalizeReport, normalize};
use crate::record::{ComplaintRecord, RawRecord};

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    /// The most recent records from the open-data endpoint.
    Live { endpoint: String, limit: usize },
    /// A user-supplied CSV file.
    Upload { path: String },
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataOrigin::Live { endpoint, limit } => write!(f, "{endpoint} (latest {limit})"),
            DataOrigin::Upload { path } => write!(f, "{path}"),
        }
    }
}

/// A normalized, immutable snapshot that every view is computed from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub origin: DataOrigin,
    pub loaded_at: DateTime<Utc>,
    pub records: Vec<ComplaintRecord>,
    pub report: NormalizeReport,
}

/// Abstraction over the two ways records enter the dashboard.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    fn origin(&self) -> DataOrigin;

    /// Reads and parses the source's CSV into raw records.
    async fn fetch_raw(&self) -> Result<Vec<RawRecord>>;
}

/// Fetches from `source` and normalizes the result into a [`Dataset`].
///
/// # Errors
///
/// Any fetch, parse or normalization failure aborts the load; no partial
/// dataset is returned.
#[tracing::instrument(skip(source), fields(origin = %source.origin()))]
pub async fn load_dataset<S>(source: &S, policy: DerivedPolicy) -> Result<Dataset>
where
    S: RecordSource + ?Sized,
{
    let origin = source.origin();
    let raw = source.fetch_raw().await?;
    let normalized =
        normalize(raw, policy).with_context(|| format!("failed to normalize {origin}"))?;

    info!(records = normalized.records.len(), "Dataset loaded");

    Ok(Dataset {
        origin,
        loaded_at: Utc::now(),
        records: normalized.records,
        report: normalized.report,
    })
}
