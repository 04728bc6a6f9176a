//! Pagination module
//!
//! Supports: Key (opaque cursor), Offset, Page Number
//!
//! # Overview
//!
//! The pagination module describes the data source boundary for each
//! addressing shape and wraps them in a single [`PageStrategy`] sum type.
//! A strategy fetches one page at a given [`Cursor`] and reports the cursor
//! that follows it; the loader decides whether to keep it.

mod strategies;
mod types;

pub use strategies::{KeyStrategy, OffsetStrategy, PageNumberStrategy, PageStrategy};
pub use types::{
    Cursor, FetchMode, Fetched, KeySource, OffsetSource, Page, PageNumberSource, StrategyKind,
};

#[cfg(test)]
pub(crate) mod mock;
