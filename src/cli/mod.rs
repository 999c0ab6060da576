//! CLI module for the logistics-insight command-line interface.
//!
//! Command handlers run the query-understanding pipeline locally and hand
//! their results to the output formatters.

mod commands;
mod output;

pub use commands::*;
