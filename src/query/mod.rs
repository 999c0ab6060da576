//! Natural language query interpretation.
//!
//! This module provides:
//! - Intent classification into the six supported logistics analyses
//! - Entity and parameter extraction per query type
//! - Time expression parsing with data-availability validation

pub mod classifier;
pub mod extractor;
pub mod processor;
pub mod temporal;
pub mod types;

pub use classifier::IntentClassifier;
pub use extractor::{scan_time_expression, ParameterExtractor};
pub use processor::{QueryProcessor, SUPPORTED_QUERIES};
pub use temporal::{validate_range, TimeExpressionParser};
pub use types::*;
