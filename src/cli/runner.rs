//! CLI runner - executes commands

use crate::binding::ListBinding;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::viewport::Viewport;
use crate::config::{LoaderConfig, StrategyConfig, TriggerConfig};
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpSourceConfig;
use crate::loader::PageLoader;
use crate::pagination::StrategyKind;
use crate::trigger::{ScrollTrigger, TriggerOutcome};
use crate::types::{LoadOutcome, LoadingPhase};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Overrides for `fetch` given on the command line
#[derive(Debug, Default)]
struct FetchArgs {
    url: Option<String>,
    strategy: Option<String>,
    page_limit: Option<u32>,
    records_path: Option<String>,
    initial_key: Option<String>,
    next_key_path: Option<String>,
}

fn no_source() -> Error {
    Error::config("no source URL; pass --url or set source.url in the config file")
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                url,
                strategy,
                page_limit,
                records_path,
                initial_key,
                next_key_path,
                max_pages,
                viewport,
            } => {
                let args = FetchArgs {
                    url: url.clone(),
                    strategy: strategy.clone(),
                    page_limit: *page_limit,
                    records_path: records_path.clone(),
                    initial_key: initial_key.clone(),
                    next_key_path: next_key_path.clone(),
                };
                self.fetch(args, *max_pages, *viewport).await
            }
            Commands::Validate => self.validate(),
        }
    }

    /// Merge the config file (if any) with command-line overrides
    fn resolve_config(&self, args: FetchArgs) -> Result<LoaderConfig> {
        let mut config = match &self.cli.config {
            Some(path) => LoaderConfig::from_file(path)?,
            None => LoaderConfig {
                strategy: StrategyConfig {
                    kind: "offset".to_string(),
                    page_limit: 20,
                    initial_key: None,
                },
                auto_start: true,
                trigger: TriggerConfig::default(),
                source: None,
            },
        };

        if let Some(kind) = args.strategy {
            config.strategy.kind = kind;
        }
        if let Some(page_limit) = args.page_limit {
            config.strategy.page_limit = page_limit;
        }
        if args.initial_key.is_some() {
            config.strategy.initial_key = args.initial_key;
        }
        if let Some(url) = args.url {
            let source = config
                .source
                .get_or_insert_with(|| HttpSourceConfig::new(url.clone()));
            source.url = url;
        }
        if let Some(path) = args.records_path {
            let source = config
                .source
                .as_mut()
                .ok_or_else(no_source)?;
            source.records_path = Some(path);
        }
        if let Some(path) = args.next_key_path {
            let source = config.source.as_mut().ok_or_else(no_source)?;
            source.next_key_path = Some(path);
        }

        if config.source.is_none() {
            return Err(no_source());
        }
        config.validate()?;
        Ok(config)
    }

    /// Page through the endpoint by scrolling a headless viewport to the end
    async fn fetch(&self, args: FetchArgs, max_pages: Option<usize>, rows: usize) -> Result<()> {
        let start = Instant::now();
        let config = self.resolve_config(args)?;
        let source = Arc::new(config.http_source()?);
        let strategy = config.build_strategy::<Value, _>(Arc::clone(&source))?;
        let loader = PageLoader::new(strategy, config.loader_options())?;

        let viewport = Arc::new(Viewport::new(rows));
        let trigger = ScrollTrigger::attached(
            viewport.clone(),
            loader.clone(),
            config.trigger_options(),
        )?;
        let mut binding = ListBinding::new(viewport.clone());

        if !config.auto_start {
            loader.start();
        }

        let mut printed = 0;
        let mut pages = 0;
        loop {
            if loader.settled().await == LoadingPhase::Error {
                let message = loader.last_error().unwrap_or_default();
                trigger.detach();
                return Err(Error::fetch(message));
            }

            let data = loader.data();
            binding.apply_snapshot(loader.snapshot());
            if data.len() > printed {
                pages += 1;
                self.print_items(&data[printed..], printed)?;
                printed = data.len();
            }
            if max_pages.is_some_and(|max| pages >= max) {
                break;
            }

            if loader.strategy_kind() == StrategyKind::Key && !loader.is_end_reached() {
                match source.last_next_key() {
                    Some(key) => loader.set_key(Some(key))?,
                    None => {
                        info!("No continuation key in response; stopping");
                        break;
                    }
                }
            }

            // a reader flicking forward even when everything fits
            let dy = viewport.scroll_to_end().max(1);
            match trigger.on_scrolled(0, dy) {
                TriggerOutcome::Requested(LoadOutcome::Started) | TriggerOutcome::Busy => {}
                TriggerOutcome::Requested(LoadOutcome::EndNotice) => {
                    info!("Reached end of data");
                    break;
                }
                outcome => {
                    info!("Stopped paging: {:?}", outcome);
                    break;
                }
            }
        }

        trigger.detach();
        info!(
            "Loaded {} items in {} pages ({} strategy) in {:?}",
            printed,
            pages,
            loader.strategy_kind(),
            start.elapsed()
        );
        Ok(())
    }

    fn print_items(&self, items: &[Value], first_index: usize) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for (offset, item) in items.iter().enumerate() {
            let index = first_index + offset;
            let line = match self.cli.format {
                OutputFormat::Json => serde_json::to_string(item),
                OutputFormat::Pretty => serde_json::to_string_pretty(item)
                    .map(|pretty| format!("#{index}\n{pretty}")),
            }
            .with_context(|| format!("Failed to serialize item {index}"))?;
            writeln!(out, "{line}").context("Failed to write to stdout")?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("validate needs --config"))?;
        let config = LoaderConfig::from_file(path)?;

        println!(
            "{}: {} strategy, page limit {}, trigger threshold {}",
            path.display(),
            config.strategy.kind()?,
            config.strategy.page_limit,
            config.trigger.threshold
        );
        if let Some(source) = &config.source {
            println!("  source: {}", source.url);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::StrategyKind;
    use clap::Parser;

    fn fetch_args(cli: &Cli) -> FetchArgs {
        match &cli.command {
            Commands::Fetch {
                url,
                strategy,
                page_limit,
                records_path,
                initial_key,
                next_key_path,
                ..
            } => FetchArgs {
                url: url.clone(),
                strategy: strategy.clone(),
                page_limit: *page_limit,
                records_path: records_path.clone(),
                initial_key: initial_key.clone(),
                next_key_path: next_key_path.clone(),
            },
            Commands::Validate => FetchArgs::default(),
        }
    }

    #[test]
    fn test_resolve_from_flags() {
        let cli = Cli::parse_from([
            "pageloader",
            "fetch",
            "--url",
            "http://localhost/feed",
            "--strategy",
            "key",
            "--page-limit",
            "5",
            "--next-key-path",
            "meta.next",
        ]);
        let args = fetch_args(&cli);
        let config = Runner::new(cli).resolve_config(args).unwrap();

        assert_eq!(config.strategy.kind().unwrap(), StrategyKind::Key);
        assert_eq!(config.strategy.page_limit, 5);
        let source = config.source.unwrap();
        assert_eq!(source.url, "http://localhost/feed");
        assert_eq!(source.next_key_path.as_deref(), Some("meta.next"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "strategy: {{kind: offset, page_limit: 20}}\nsource: {{url: http://localhost/a}}"
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let cli = Cli::parse_from([
            "pageloader",
            "--config",
            path.as_str(),
            "fetch",
            "--url",
            "http://localhost/b",
            "--records-path",
            "data",
        ]);
        let args = fetch_args(&cli);
        let config = Runner::new(cli).resolve_config(args).unwrap();

        assert_eq!(config.strategy.page_limit, 20);
        let source = config.source.unwrap();
        assert_eq!(source.url, "http://localhost/b");
        assert_eq!(source.records_path.as_deref(), Some("data"));
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let cli = Cli::parse_from(["pageloader", "fetch", "--records-path", "data"]);
        let args = fetch_args(&cli);
        let err = Runner::new(cli).resolve_config(args).unwrap_err();
        assert!(err.is_configuration());
    }
}
