//! HTTP module
//!
//! A ready-made data source for JSON endpoints, usable with any of the
//! three addressing strategies.

mod source;

pub use source::{decode_page, HttpSource, HttpSourceConfig};

#[cfg(test)]
mod tests;
