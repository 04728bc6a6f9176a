//! Pagination strategy implementations
//!
//! Each strategy knows how to ask its data source for the initial and the
//! next page, and which cursor follows a successful fetch. Strategies never
//! mutate their own state; the loader owns the cursor.

use super::types::{
    Cursor, FetchMode, Fetched, KeySource, OffsetSource, PageNumberSource, StrategyKind,
};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

fn check_limit(page_limit: u32) -> Result<u32> {
    if page_limit == 0 {
        return Err(Error::invalid_value("page_limit", "must be positive"));
    }
    Ok(page_limit)
}

// ============================================================================
// Key Strategy
// ============================================================================

/// Key-based pagination
///
/// The key is never derived from a response. Callers that receive a
/// continuation token assign it through the loader before the next fetch.
pub struct KeyStrategy<T> {
    source: Arc<dyn KeySource<T>>,
    page_limit: u32,
    initial_key: Option<String>,
}

impl<T: Send> KeyStrategy<T> {
    /// Create a new key strategy
    pub fn new(source: Arc<dyn KeySource<T>>, page_limit: u32) -> Result<Self> {
        Ok(Self {
            source,
            page_limit: check_limit(page_limit)?,
            initial_key: None,
        })
    }

    /// Key used until the first reset; a reset clears it
    #[must_use]
    pub fn with_initial_key(mut self, key: impl Into<String>) -> Self {
        self.initial_key = Some(key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    async fn fetch(&self, key: Option<&str>, mode: FetchMode) -> Result<Fetched<T>> {
        let page = match mode {
            FetchMode::Initial => self.source.load_initial().await?,
            FetchMode::Next => self.source.load_next(key).await?,
        };
        Ok(Fetched::new(page, Cursor::Key(key.map(ToString::to_string))))
    }
}

// ============================================================================
// Offset Strategy
// ============================================================================

/// Offset-based pagination
///
/// The offset advances by the page limit after every successful fetch,
/// even when the page came back short.
pub struct OffsetStrategy<T> {
    source: Arc<dyn OffsetSource<T>>,
    page_limit: u32,
}

impl<T: Send> OffsetStrategy<T> {
    /// Create a new offset strategy
    pub fn new(source: Arc<dyn OffsetSource<T>>, page_limit: u32) -> Result<Self> {
        Ok(Self {
            source,
            page_limit: check_limit(page_limit)?,
        })
    }

    async fn fetch(&self, offset: u32, mode: FetchMode) -> Result<Fetched<T>> {
        let page = match mode {
            FetchMode::Initial => self.source.load_initial(offset, self.page_limit).await?,
            FetchMode::Next => self.source.load_next(offset, self.page_limit).await?,
        };
        Ok(Fetched::new(
            page,
            Cursor::Offset(offset.saturating_add(self.page_limit)),
        ))
    }
}

// ============================================================================
// Page Number Strategy
// ============================================================================

/// Page number pagination, counting from 0
pub struct PageNumberStrategy<T> {
    source: Arc<dyn PageNumberSource<T>>,
    page_limit: u32,
}

impl<T: Send> PageNumberStrategy<T> {
    /// Create a new page number strategy
    pub fn new(source: Arc<dyn PageNumberSource<T>>, page_limit: u32) -> Result<Self> {
        Ok(Self {
            source,
            page_limit: check_limit(page_limit)?,
        })
    }

    async fn fetch(&self, page: u32, mode: FetchMode) -> Result<Fetched<T>> {
        let items = match mode {
            FetchMode::Initial => self.source.load_initial(page).await?,
            FetchMode::Next => self.source.load_next(page).await?,
        };
        Ok(Fetched::new(items, Cursor::Page(page.saturating_add(1))))
    }
}

// ============================================================================
// Strategy Sum Type
// ============================================================================

/// The addressing strategy a loader is built with
pub enum PageStrategy<T> {
    /// Opaque key
    Key(KeyStrategy<T>),
    /// Offset + limit
    Offset(OffsetStrategy<T>),
    /// Page counter
    PageNumber(PageNumberStrategy<T>),
}

impl<T: Send + 'static> PageStrategy<T> {
    /// Key strategy over `source`
    pub fn key(source: Arc<dyn KeySource<T>>, page_limit: u32) -> Result<Self> {
        KeyStrategy::new(source, page_limit).map(Self::Key)
    }

    /// Offset strategy over `source`
    pub fn offset(source: Arc<dyn OffsetSource<T>>, page_limit: u32) -> Result<Self> {
        OffsetStrategy::new(source, page_limit).map(Self::Offset)
    }

    /// Page number strategy over `source`
    pub fn page_number(source: Arc<dyn PageNumberSource<T>>, page_limit: u32) -> Result<Self> {
        PageNumberStrategy::new(source, page_limit).map(Self::PageNumber)
    }

    /// Pick a strategy by kind for a source that speaks every shape
    pub fn for_kind<S>(kind: StrategyKind, source: Arc<S>, page_limit: u32) -> Result<Self>
    where
        S: KeySource<T> + OffsetSource<T> + PageNumberSource<T> + 'static,
    {
        match kind {
            StrategyKind::Key => Self::key(source, page_limit),
            StrategyKind::Offset => Self::offset(source, page_limit),
            StrategyKind::PageNumber => Self::page_number(source, page_limit),
        }
    }

    /// Initial key for a key strategy; other strategies are returned unchanged
    #[must_use]
    pub fn with_initial_key(self, key: impl Into<String>) -> Self {
        match self {
            Self::Key(s) => Self::Key(s.with_initial_key(key)),
            other => other,
        }
    }

    /// Number of items a full page holds
    pub fn page_limit(&self) -> u32 {
        match self {
            Self::Key(s) => s.page_limit,
            Self::Offset(s) => s.page_limit,
            Self::PageNumber(s) => s.page_limit,
        }
    }

    /// Which addressing shape this is
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Key(_) => StrategyKind::Key,
            Self::Offset(_) => StrategyKind::Offset,
            Self::PageNumber(_) => StrategyKind::PageNumber,
        }
    }

    /// Cursor right after creation; carries the initial key, if any
    pub fn initial_cursor(&self) -> Cursor {
        match self {
            Self::Key(s) => Cursor::Key(s.initial_key.clone()),
            other => other.reset_cursor(),
        }
    }

    /// Cursor after a reset: no key, offset 0 or page 0
    pub fn reset_cursor(&self) -> Cursor {
        match self {
            Self::Key(_) => Cursor::Key(None),
            Self::Offset(_) => Cursor::Offset(0),
            Self::PageNumber(_) => Cursor::Page(0),
        }
    }

    /// Fetch one page at `cursor`
    pub async fn fetch(&self, cursor: &Cursor, mode: FetchMode) -> Result<Fetched<T>> {
        match (self, cursor) {
            (Self::Key(s), Cursor::Key(key)) => s.fetch(key.as_deref(), mode).await,
            (Self::Offset(s), Cursor::Offset(offset)) => s.fetch(*offset, mode).await,
            (Self::PageNumber(s), Cursor::Page(page)) => s.fetch(*page, mode).await,
            (strategy, cursor) => Err(Error::config(format!(
                "{} cursor cannot address a {} strategy",
                cursor.kind(),
                strategy.kind()
            ))),
        }
    }
}

impl<T> fmt::Debug for PageStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, page_limit) = match self {
            Self::Key(s) => ("key", s.page_limit),
            Self::Offset(s) => ("offset", s.page_limit),
            Self::PageNumber(s) => ("page_number", s.page_limit),
        };
        f.debug_struct("PageStrategy")
            .field("kind", &kind)
            .field("page_limit", &page_limit)
            .finish()
    }
}
