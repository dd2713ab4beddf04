use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, warn};

use crate::cache::FetchKey;
use crate::config::Config;
use crate::fetch::{AppToken, BasicClient, HttpClient, fetch_bytes};
use crate::parser::parse_records;
use crate::record::RawRecord;
use crate::services::record_source::{DataOrigin, RecordSource};

/// Pulls the most recent service requests from the Socrata CSV endpoint.
pub struct OpenDataClient<C = AppToken<BasicClient>> {
    http: C,
    endpoint: String,
    limit: usize,
}

impl OpenDataClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = AppToken::new(
            BasicClient::new(config.http_timeout)?,
            config.app_token.as_deref(),
        )?;
        Ok(Self::with_client(http, &config.endpoint, config.limit))
    }
}

impl<C: HttpClient> OpenDataClient<C> {
    pub fn with_client(http: C, endpoint: &str, limit: usize) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            limit,
        }
    }

    /// Cache key for the rows this client fetches.
    pub fn fetch_key(&self) -> FetchKey {
        FetchKey {
            endpoint: self.endpoint.clone(),
            limit: self.limit,
        }
    }

    /// Endpoint URL ordered newest first and capped at `limit` rows.
    pub fn query_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid endpoint '{}'", self.endpoint))?;
        url.query_pairs_mut()
            .append_pair("$order", "created_date DESC")
            .append_pair("$limit", &self.limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> RecordSource for OpenDataClient<C> {
    fn origin(&self) -> DataOrigin {
        DataOrigin::Live {
            endpoint: self.endpoint.clone(),
            limit: self.limit,
        }
    }

    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint, limit = self.limit))]
    async fn fetch_raw(&self) -> Result<Vec<RawRecord>> {
        let url = self.query_url()?;

        let fetch_start = std::time::Instant::now();
        let bytes = fetch_bytes(&self.http, url.as_str())
            .await
            .with_context(|| format!("failed to fetch {}", self.endpoint))?;
        let elapsed = fetch_start.elapsed();
        if elapsed.as_secs() > 15 {
            warn!(elapsed_secs = elapsed.as_secs(), "Open data fetch was slow");
        }
        debug!(bytes = bytes.len(), "Response received, parsing");

        let records = parse_records(&bytes).context("open data response is not a usable 311 CSV")?;
        if records.len() < self.limit {
            debug!(
                received = records.len(),
                requested = self.limit,
                "Endpoint returned fewer rows than requested"
            );
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url() {
        let client = OpenDataClient::from_config(&Config::default()).unwrap();
        let url = client.query_url().unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("data.cityofnewyork.us"));
        assert_eq!(
            pairs,
            vec![
                ("$order".to_string(), "created_date DESC".to_string()),
                ("$limit".to_string(), "5000".to_string()),
            ]
        );
    }

    #[test]
    fn test_fetch_key_matches_config() {
        let config = Config {
            endpoint: "http://localhost:8080/resource/test.csv".to_string(),
            limit: 250,
            ..Config::default()
        };
        let client = OpenDataClient::from_config(&config).unwrap();

        assert_eq!(
            client.fetch_key(),
            FetchKey {
                endpoint: config.endpoint.clone(),
                limit: 250,
            }
        );
    }

    #[test]
    fn test_origin() {
        let client = OpenDataClient::from_config(&Config::default()).unwrap();
        assert_eq!(
            client.origin(),
            DataOrigin::Live {
                endpoint: crate::config::DEFAULT_ENDPOINT.to_string(),
                limit: 5000,
            }
        );
    }
}
