//! # pageloader
//!
//! Incremental pagination for scrolling lists.
//!
//! A [`PageLoader`] owns an ordered collection of items that grows one page
//! at a time. A [`ScrollTrigger`] watches a list surface and asks the loader
//! for the next page when the reader nears the end, and a [`ListBinding`]
//! turns the growing collection into minimal list change notifications.
//!
//! ## Features
//!
//! - **Three addressing strategies**: continuation key, offset/limit, page number
//! - **Single-flight loading**: at most one page request is outstanding
//! - **Invalidate and cancel**: stale results are discarded by epoch
//! - **HTTP sources**: page any JSON endpoint with configurable query parameters
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pageloader::{HttpSource, HttpSourceConfig, LoaderOptions, PageLoader, PageStrategy};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pageloader::Result<()> {
//!     let source = Arc::new(HttpSource::new(HttpSourceConfig::new("https://api.example.com/items"))?);
//!     let strategy = PageStrategy::offset(source, 20)?;
//!     let loader = PageLoader::new(strategy, LoaderOptions::new())?;
//!
//!     loader.settled().await;
//!     println!("{} items", loader.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  on_scrolled   ┌──────────────┐  fetch   ┌──────────────┐
//! │ ScrollTrigger│ ─────────────▶ │  PageLoader  │ ───────▶ │ PageStrategy │
//! │ (ListSurface)│   load_next    │ state, epoch │ ◀─────── │ Key | Offset │
//! └──────────────┘                └──────┬───────┘  page    │ | PageNumber │
//!                                        │ data slot        └──────┬───────┘
//!                                        ▼                         ▼
//!                                 ┌──────────────┐          ┌──────────────┐
//!                                 │ ListBinding  │          │ page source  │
//!                                 │  (ListSink)  │          │ (HttpSource) │
//!                                 └──────────────┘          └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Loading phase and load outcome types
pub mod types;

/// Page addressing strategies and source traits
pub mod pagination;

/// The pagination controller
pub mod loader;

/// Scroll-driven load triggering
pub mod trigger;

/// List change notifications
pub mod binding;

/// HTTP page source
pub mod http;

/// YAML loader configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use binding::{bind, ListBinding, ListChange, ListSink};
pub use config::LoaderConfig;
pub use http::{HttpSource, HttpSourceConfig};
pub use loader::{LoaderOptions, PageLoader, Snapshot};
pub use pagination::{Cursor, KeySource, OffsetSource, Page, PageNumberSource, PageStrategy, StrategyKind};
pub use trigger::{LayoutKind, ListSurface, ScrollTrigger, TriggerOptions, TriggerOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
