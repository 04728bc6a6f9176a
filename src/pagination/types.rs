//! Pagination types and traits
//!
//! Defines the data source boundary for each addressing shape and the
//! addressing state the loader carries between fetches.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One batch returned by a data source. `None` means no more data.
pub type Page<T> = Option<Vec<T>>;

// ============================================================================
// Data Source Traits
// ============================================================================

/// Data source addressed by an opaque continuation key
#[async_trait]
pub trait KeySource<T>: Send + Sync {
    /// Fetch the first page (no key)
    async fn load_initial(&self) -> Result<Page<T>>;

    /// Fetch the page after `key`
    async fn load_next(&self, key: Option<&str>) -> Result<Page<T>>;
}

/// Data source addressed by a numeric offset and a limit
#[async_trait]
pub trait OffsetSource<T>: Send + Sync {
    /// Fetch the first page
    async fn load_initial(&self, offset: u32, limit: u32) -> Result<Page<T>>;

    /// Fetch the page starting at `offset`
    async fn load_next(&self, offset: u32, limit: u32) -> Result<Page<T>>;
}

/// Data source addressed by a sequential page number
#[async_trait]
pub trait PageNumberSource<T>: Send + Sync {
    /// Fetch the first page
    async fn load_initial(&self, page: u32) -> Result<Page<T>>;

    /// Fetch page number `page`
    async fn load_next(&self, page: u32) -> Result<Page<T>>;
}

// ============================================================================
// Addressing State
// ============================================================================

/// Addressing state owned by the loader and threaded into each fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Continuation key; `None` requests from the start
    Key(Option<String>),
    /// Item offset
    Offset(u32),
    /// Page counter
    Page(u32),
}

impl Cursor {
    /// Short name of the addressing shape this cursor belongs to
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Key(_) => StrategyKind::Key,
            Self::Offset(_) => StrategyKind::Offset,
            Self::Page(_) => StrategyKind::PageNumber,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(Some(key)) => write!(f, "key={key}"),
            Self::Key(None) => f.write_str("key=<none>"),
            Self::Offset(offset) => write!(f, "offset={offset}"),
            Self::Page(page) => write!(f, "page={page}"),
        }
    }
}

/// Whether a fetch is the first of a cycle series or a continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First page since creation or the last invalidate
    Initial,
    /// Any following page
    Next,
}

/// Result of a successful fetch: the items plus the cursor to use next.
///
/// The loader applies `next` only if the fetch belongs to the current epoch,
/// so a cursor never advances on failure or after an invalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    /// Items returned; empty when the source answered with no data
    pub items: Vec<T>,
    /// Addressing state after this page
    pub next: Cursor,
}

impl<T> Fetched<T> {
    /// Build a fetch result from a source page
    pub fn new(page: Page<T>, next: Cursor) -> Self {
        Self {
            items: page.unwrap_or_default(),
            next,
        }
    }

    /// A page shorter than the limit marks the end of the data
    pub fn reaches_end(&self, page_limit: u32) -> bool {
        self.items.len() < page_limit as usize
    }
}

// ============================================================================
// Strategy Kind
// ============================================================================

/// The three recognised addressing shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Opaque continuation key
    Key,
    /// Numeric offset + limit
    Offset,
    /// Sequential page number
    PageNumber,
}

impl StrategyKind {
    /// Config name of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Offset => "offset",
            Self::PageNumber => "page_number",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "key" | "cursor" => Ok(Self::Key),
            "offset" => Ok(Self::Offset),
            "page_number" | "page" => Ok(Self::PageNumber),
            other => Err(Error::config(format!(
                "unrecognized pagination strategy '{other}' (expected key, offset or page_number)"
            ))),
        }
    }
}
