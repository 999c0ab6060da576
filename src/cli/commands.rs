//! CLI command handlers.

use anyhow::Result;
use logistics_insight::{Config, QueryProcessor, TimeExpressionParser, TimeRange, TimeValidation};
use serde::Serialize;

use super::output;

/// A time expression resolved against the data window.
#[derive(Debug, Serialize)]
pub struct ParsedTime {
    pub expression: String,
    pub requested: TimeRange,
    pub validation: TimeValidation,
}

/// Run the interpret command.
pub fn run_interpret(config: &Config, query: &str, json_output: bool) -> Result<()> {
    let processor = QueryProcessor::new(config.data.bounds());
    let extracted = processor.process(query);
    output::print_extracted_query(&extracted, json_output);
    Ok(())
}

/// Run the examples command.
pub fn run_examples(json_output: bool) -> Result<()> {
    output::print_examples(QueryProcessor::supported_query_examples(), json_output);
    Ok(())
}

/// Run the parse-time command.
pub fn run_parse_time(config: &Config, expr: &str, json_output: bool) -> Result<()> {
    let parser = TimeExpressionParser::new(config.data.bounds());
    let requested = parser.parse(expr);
    let validation = parser.validate(&requested);

    let parsed = ParsedTime {
        expression: expr.to_string(),
        requested,
        validation,
    };
    output::print_parsed_time(&parsed, json_output);
    Ok(())
}
