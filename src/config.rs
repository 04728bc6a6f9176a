//! Configuration types for loaders
//!
//! A loader is described in YAML: which addressing strategy to use, how
//! large a page is, when to trigger the next page and, optionally, which
//! HTTP endpoint to read from.

use crate::error::{Error, Result};
use crate::http::{HttpSource, HttpSourceConfig};
use crate::loader::LoaderOptions;
use crate::pagination::{KeySource, OffsetSource, PageNumberSource, PageStrategy, StrategyKind};
use crate::trigger::{TriggerOptions, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Top-Level Loader Config
// ============================================================================

/// Complete loader configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Addressing strategy
    pub strategy: StrategyConfig,

    /// Start loading on creation
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,

    /// Scroll trigger settings
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// HTTP data source
    #[serde(default)]
    pub source: Option<HttpSourceConfig>,
}

fn default_auto_start() -> bool {
    true
}

impl LoaderConfig {
    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values that cannot build a loader
    pub fn validate(&self) -> Result<()> {
        self.strategy.kind()?;
        if self.strategy.page_limit == 0 {
            return Err(Error::invalid_value("strategy.page_limit", "must be positive"));
        }
        if self.trigger.threshold == 0 {
            return Err(Error::invalid_value("trigger.threshold", "must be positive"));
        }
        if let Some(source) = &self.source {
            if source.url.trim().is_empty() {
                return Err(Error::invalid_value("source.url", "must not be empty"));
            }
        }
        Ok(())
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions::new().with_auto_start(self.auto_start)
    }

    pub fn trigger_options(&self) -> TriggerOptions {
        TriggerOptions::new().with_threshold(self.trigger.threshold)
    }

    /// Build the configured HTTP source
    ///
    /// Key and page-number requests send the page limit as the page size
    /// unless the source sets its own.
    pub fn http_source(&self) -> Result<HttpSource> {
        let mut source = self
            .source
            .clone()
            .ok_or_else(|| Error::config("no source configured"))?;
        if source.page_size.is_none() {
            source.page_size = Some(self.strategy.page_limit);
        }
        HttpSource::new(source)
    }

    /// Build the configured strategy over a source that speaks every shape
    pub fn build_strategy<T, S>(&self, source: Arc<S>) -> Result<PageStrategy<T>>
    where
        T: Send + 'static,
        S: KeySource<T> + OffsetSource<T> + PageNumberSource<T> + 'static,
    {
        let strategy = PageStrategy::for_kind(self.strategy.kind()?, source, self.strategy.page_limit)?;
        Ok(match &self.strategy.initial_key {
            Some(key) => strategy.with_initial_key(key.clone()),
            None => strategy,
        })
    }
}

// ============================================================================
// Strategy Config
// ============================================================================

/// Addressing strategy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// `key`, `offset` or `page_number`
    pub kind: String,

    /// Items per full page
    pub page_limit: u32,

    /// Key used for the first `load_next` of a key strategy
    #[serde(default)]
    pub initial_key: Option<String>,
}

impl StrategyConfig {
    /// Parsed strategy kind; unknown kinds are configuration errors
    pub fn kind(&self) -> Result<StrategyKind> {
        self.kind.parse()
    }
}

// ============================================================================
// Trigger Config
// ============================================================================

/// Scroll trigger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Unseen trailing items below which the next page loads
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

fn default_threshold() -> usize {
    DEFAULT_THRESHOLD
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r"
strategy:
  kind: offset
  page_limit: 20
auto_start: false
trigger:
  threshold: 5
source:
  url: http://localhost:8080/items
  records_path: data
  offset_param: skip
";

    #[test]
    fn test_parse_full_config() {
        let config = LoaderConfig::from_yaml(FULL).unwrap();
        assert_eq!(config.strategy.kind().unwrap(), StrategyKind::Offset);
        assert_eq!(config.strategy.page_limit, 20);
        assert!(!config.auto_start);
        assert_eq!(config.trigger.threshold, 5);

        let source = config.source.as_ref().unwrap();
        assert_eq!(source.offset_param, "skip");
        assert_eq!(source.limit_param, "limit");
        assert_eq!(source.records_path.as_deref(), Some("data"));

        assert!(!config.loader_options().auto_start);
        assert_eq!(config.trigger_options().threshold, 5);
    }

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::from_yaml("strategy: {kind: page_number, page_limit: 10}").unwrap();
        assert!(config.auto_start);
        assert_eq!(config.trigger.threshold, DEFAULT_THRESHOLD);
        assert!(config.source.is_none());
        assert!(config.http_source().unwrap_err().is_configuration());
    }

    #[test]
    fn test_unknown_strategy_kind() {
        let err = LoaderConfig::from_yaml("strategy: {kind: link_header, page_limit: 10}").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_zero_page_limit() {
        let err = LoaderConfig::from_yaml("strategy: {kind: offset, page_limit: 0}").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "strategy.page_limit"));
    }

    #[test]
    fn test_zero_threshold() {
        let yaml = "strategy: {kind: offset, page_limit: 5}\ntrigger: {threshold: 0}";
        let err = LoaderConfig::from_yaml(yaml).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_strategy_is_yaml_error() {
        let err = LoaderConfig::from_yaml("auto_start: true").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = LoaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.strategy.page_limit, 20);

        let err = LoaderConfig::from_file("/nonexistent/loader.yaml").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_http_source_inherits_page_limit() {
        let config = LoaderConfig::from_yaml(FULL).unwrap();
        let source = config.http_source().unwrap();
        assert_eq!(source.config().page_size, Some(20));
    }

    #[test]
    fn test_build_strategy_with_initial_key() {
        let yaml = r"
strategy:
  kind: key
  page_limit: 10
  initial_key: start
source:
  url: http://localhost/feed
";
        let config = LoaderConfig::from_yaml(yaml).unwrap();
        let source = Arc::new(config.http_source().unwrap());
        let strategy: PageStrategy<serde_json::Value> = config.build_strategy(source).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Key);
        assert_eq!(
            strategy.initial_cursor(),
            crate::pagination::Cursor::Key(Some("start".into()))
        );
    }
}
