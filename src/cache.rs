//! Memoization of the loaded dataset across interactions.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use moka::future::Cache;
use tracing::{debug, info};

use crate::services::Dataset;

/// Parameters that identify one live fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub endpoint: String,
    pub limit: usize,
}

/// A single-entry cache holding the most recently fetched dataset.
///
/// Loads for the same key are coalesced, failed loads are not cached, and
/// the entry only changes on an explicit [`DatasetCache::refresh`].
#[derive(Clone)]
pub struct DatasetCache {
    inner: Cache<FetchKey, Arc<Dataset>>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().max_capacity(1).build(),
        }
    }

    /// Returns the cached dataset for `key`, running `load` on a miss.
    pub async fn get_or_load<F>(&self, key: FetchKey, load: F) -> Result<Arc<Dataset>>
    where
        F: Future<Output = Result<Dataset>>,
    {
        if self.inner.contains_key(&key) {
            debug!(endpoint = %key.endpoint, "Dataset cache hit");
        }

        self.inner
            .try_get_with(key, async { load.await.map(Arc::new) })
            .await
            .map_err(|e| anyhow::anyhow!("{e:#}"))
    }

    /// Drops any cached dataset for `key` and loads a fresh one.
    pub async fn refresh<F>(&self, key: FetchKey, load: F) -> Result<Arc<Dataset>>
    where
        F: Future<Output = Result<Dataset>>,
    {
        info!(endpoint = %key.endpoint, "Refreshing cached dataset");
        self.inner.invalidate(&key).await;
        self.get_or_load(key, load).await
    }
}
