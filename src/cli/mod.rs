//! CLI module
//!
//! Command-line interface for paging through an HTTP endpoint.
//!
//! # Commands
//!
//! - `fetch` - Load pages by simulating a reader scrolling to the end
//! - `validate` - Check a loader config file

mod commands;
mod runner;
mod viewport;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use viewport::Viewport;
