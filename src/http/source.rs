//! HTTP page source
//!
//! Fetches pages of JSON records from an HTTP endpoint. The addressing
//! parameters are added as query parameters whose names are configurable.

use crate::error::{Error, Result};
use crate::pagination::{KeySource, OffsetSource, Page, PageNumberSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for an HTTP page source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Endpoint URL; may already carry query parameters
    pub url: String,

    /// Dot path to the records array (e.g. `data.items`); whole body if unset
    #[serde(default)]
    pub records_path: Option<String>,

    /// Query parameter for the offset
    #[serde(default = "default_offset_param")]
    pub offset_param: String,

    /// Query parameter for the limit / page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Query parameter for the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter for the continuation key
    #[serde(default = "default_key_param")]
    pub key_param: String,

    /// Dot path to the continuation key in each response (key strategy)
    #[serde(default)]
    pub next_key_path: Option<String>,

    /// Page size sent with key and page-number requests
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_key_param() -> String {
    "cursor".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpSourceConfig {
    /// Create a config for `url` with default parameter names
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            records_path: None,
            offset_param: default_offset_param(),
            limit_param: default_limit_param(),
            page_param: default_page_param(),
            key_param: default_key_param(),
            next_key_path: None,
            page_size: None,
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
        }
    }

    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Set the path of the continuation key
    #[must_use]
    pub fn with_next_key_path(mut self, path: impl Into<String>) -> Self {
        self.next_key_path = Some(path.into());
        self
    }

    /// Set the page size sent with key and page-number requests
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Data source backed by a JSON HTTP endpoint
///
/// Implements every addressing shape, so any strategy can be built on it.
/// When `next_key_path` is set, the continuation key of the latest response
/// is kept for the caller to assign to a key-strategy loader.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
    config: HttpSourceConfig,
    next_key: Arc<Mutex<Option<String>>>,
}

impl HttpSource {
    /// Create a new HTTP source
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("pageloader/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
            next_key: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Continuation key found in the most recent response
    pub fn last_next_key(&self) -> Option<String> {
        self.next_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn page_size_param(&self) -> Option<(String, String)> {
        self.config
            .page_size
            .map(|size| (self.config.limit_param.clone(), size.to_string()))
    }

    /// GET the endpoint with `query` appended and decode one page
    async fn get_page(&self, query: Vec<(String, String)>) -> Result<Page<Value>> {
        let mut url = self.base_url.clone();
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query {
                pairs.append_pair(key, value);
            }
        }

        debug!("Fetching page: {}", url);
        let mut request = self.client.get(url.clone());
        for (key, value) in &self.config.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::http_status(status.as_u16(), body));
        }

        let value = parse_body(&body)?;
        if let Some(path) = &self.config.next_key_path {
            let key = value.as_ref().and_then(|v| extract_key(v, path));
            *self.next_key.lock().unwrap_or_else(PoisonError::into_inner) = key;
        }

        match value {
            Some(value) => records_from(&value, self.config.records_path.as_deref()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl KeySource<Value> for HttpSource {
    async fn load_initial(&self) -> Result<Page<Value>> {
        let query = self.page_size_param().into_iter().collect();
        self.get_page(query).await
    }

    async fn load_next(&self, key: Option<&str>) -> Result<Page<Value>> {
        let mut query: Vec<_> = self.page_size_param().into_iter().collect();
        if let Some(key) = key {
            query.push((self.config.key_param.clone(), key.to_string()));
        }
        self.get_page(query).await
    }
}

#[async_trait]
impl OffsetSource<Value> for HttpSource {
    async fn load_initial(&self, offset: u32, limit: u32) -> Result<Page<Value>> {
        OffsetSource::load_next(self, offset, limit).await
    }

    async fn load_next(&self, offset: u32, limit: u32) -> Result<Page<Value>> {
        let query = vec![
            (self.config.offset_param.clone(), offset.to_string()),
            (self.config.limit_param.clone(), limit.to_string()),
        ];
        self.get_page(query).await
    }
}

#[async_trait]
impl PageNumberSource<Value> for HttpSource {
    async fn load_initial(&self, page: u32) -> Result<Page<Value>> {
        PageNumberSource::load_next(self, page).await
    }

    async fn load_next(&self, page: u32) -> Result<Page<Value>> {
        let mut query = vec![(self.config.page_param.clone(), page.to_string())];
        query.extend(self.page_size_param());
        self.get_page(query).await
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a response body into a page
///
/// A missing or null records value is an absent page; anything other
/// than an array is a decode error.
pub fn decode_page(body: &str, records_path: Option<&str>) -> Result<Page<Value>> {
    match parse_body(body)? {
        Some(value) => records_from(&value, records_path),
        None => Ok(None),
    }
}

fn parse_body(body: &str) -> Result<Option<Value>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
}

fn records_from(value: &Value, records_path: Option<&str>) -> Result<Page<Value>> {
    let records = match records_path {
        Some(path) => extract_path(value, path),
        None => Some(value),
    };

    match records {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        Some(other) => Err(Error::decode(format!(
            "expected an array of records, found {}",
            json_type(other)
        ))),
    }
}

/// Follow a dot path (`$.data.items` or `data.items`); numeric parts index arrays
fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.').filter(|p| !p.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Continuation key at `path`; empty strings and nulls mean none
fn extract_key(value: &Value, path: &str) -> Option<String> {
    match extract_path(value, path)? {
        Value::String(key) if !key.is_empty() => Some(key.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
