//! HTTP client for the hosted JSON collection
//!
//! The collection is a single JSON document holding every saved sermon.
//!
//! - `GET {base}/{collection}/latest` returns `{"record": [...]}`
//! - `PUT {base}/{collection}` overwrites it with the full array
//!
//! Both requests carry a static bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::error::{RepositoryError, RepositoryResult};
use crate::config::RepositoryConfig;
use crate::models::SavedSermon;

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 20;

/// Whole-document access to the remote collection
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Read the latest snapshot; `NotFound` if the collection does not exist
    async fn fetch_latest(&self) -> RepositoryResult<Vec<SavedSermon>>;

    /// Overwrite the collection with `records`
    async fn overwrite(&self, records: &[SavedSermon]) -> RepositoryResult<()>;
}

/// [`RemoteCollection`] backed by a JSON bin REST API
#[derive(Debug, Clone)]
pub struct HttpCollection {
    client: Client,
    base_url: String,
    collection: String,
    api_key: String,
}

impl HttpCollection {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        api_key: impl Into<String>,
    ) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("sermon/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            collection: collection.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from configuration
    pub fn from_config(config: &RepositoryConfig) -> RepositoryResult<Self> {
        let collection = config
            .collection
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RepositoryError::NotConfigured("collection is not set".into()))?;
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RepositoryError::NotConfigured("api_key is not set".into()))?;
        Self::new(config.base_url.clone(), collection, api_key)
    }

    /// URL of the collection document
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.collection)
    }

    /// URL of the latest version of the collection
    pub fn latest_url(&self) -> String {
        format!("{}/latest", self.collection_url())
    }

    async fn check(response: Response) -> RepositoryResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RepositoryError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl RemoteCollection for HttpCollection {
    async fn fetch_latest(&self) -> RepositoryResult<Vec<SavedSermon>> {
        let url = self.latest_url();
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        // 404 surfaces as `NotFound` through `from_status`
        let bytes = Self::check(response).await?.bytes().await?;
        parse_latest_body(&bytes)
    }

    async fn overwrite(&self, records: &[SavedSermon]) -> RepositoryResult<()> {
        let url = self.collection_url();
        debug!("PUT {} ({} records)", url, records.len());
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .json(records)
            .send()
            .await?;
        Self::check(response).await?;
        info!("Collection overwritten with {} sermons", records.len());
        Ok(())
    }
}

#[derive(Deserialize)]
struct LatestBody {
    #[serde(default)]
    record: Value,
}

/// Decode a `GET .../latest` body
///
/// A freshly created collection may hold `null` or an empty object instead
/// of an array; both read as empty.
pub fn parse_latest_body(bytes: &[u8]) -> RepositoryResult<Vec<SavedSermon>> {
    let body: LatestBody = serde_json::from_slice(bytes)
        .map_err(|e| RepositoryError::InvalidResponse(e.to_string()))?;
    match body.record {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        record @ Value::Array(_) => serde_json::from_value(record)
            .map_err(|e| RepositoryError::InvalidResponse(e.to_string())),
        other => Err(RepositoryError::InvalidResponse(format!(
            "expected an array of sermons, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_outline;

    #[test]
    fn test_urls() {
        let client = HttpCollection::new("https://api.example.com/v3/b/", "abc123", "key").unwrap();
        assert_eq!(client.collection_url(), "https://api.example.com/v3/b/abc123");
        assert_eq!(client.latest_url(), "https://api.example.com/v3/b/abc123/latest");
    }

    #[test]
    fn test_from_config_requires_collection_and_key() {
        let mut config = RepositoryConfig::default();
        assert!(matches!(
            HttpCollection::from_config(&config),
            Err(RepositoryError::NotConfigured(_))
        ));

        config.collection = Some("abc".into());
        assert!(matches!(
            HttpCollection::from_config(&config),
            Err(RepositoryError::NotConfigured(_))
        ));

        config.api_key = Some("secret".into());
        assert!(HttpCollection::from_config(&config).is_ok());
    }

    #[test]
    fn test_parse_latest_body() {
        let saved = SavedSermon::with_id(1, "Jo 1", sample_outline());
        let body = serde_json::json!({
            "record": [saved.clone()],
            "metadata": {"id": "abc", "private": true}
        });
        let parsed = parse_latest_body(body.to_string().as_bytes()).unwrap();
        assert_eq!(parsed, vec![saved]);
    }

    #[test]
    fn test_parse_latest_body_empty_variants() {
        assert!(parse_latest_body(br#"{"record": null}"#).unwrap().is_empty());
        assert!(parse_latest_body(br#"{"record": {}}"#).unwrap().is_empty());
        assert!(parse_latest_body(br#"{"record": []}"#).unwrap().is_empty());
        assert!(parse_latest_body(br#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_latest_body_invalid() {
        assert!(matches!(
            parse_latest_body(br#"{"record": "x"}"#),
            Err(RepositoryError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_latest_body(b"not json"),
            Err(RepositoryError::InvalidResponse(_))
        ));
    }
}
