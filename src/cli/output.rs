//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use logistics_insight::{AnalysisRequest, ExtractedQuery, SupportedQuery, TimeContext};

use super::commands::ParsedTime;

/// Print an interpreted query.
pub fn print_extracted_query(result: &ExtractedQuery, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
        return;
    }

    println!("Query: {}", result.original_query);
    println!("Type: {}", result.query_type().display_name());

    match result.as_request() {
        Some(request) => print_request(request),
        None => {
            if let Some(error) = result.error() {
                println!("Error: {}", error);
            }
            if !result.supported_queries().is_empty() {
                println!("\nTry one of:");
                for example in result.supported_queries() {
                    println!("  - {}", example);
                }
            }
        }
    }
}

fn print_request(request: &AnalysisRequest) {
    match request {
        AnalysisRequest::CityDelayAnalysis { city, date, .. } => {
            println!("City: {}", city);
            println!("Date: {}", date.date());
        }
        AnalysisRequest::ClientFailureAnalysis { client, .. } => {
            println!("Client: {}", client);
        }
        AnalysisRequest::WarehouseFailureAnalysis { warehouse, .. } => {
            println!("Warehouse: {}", warehouse);
        }
        AnalysisRequest::CityComparison { city_a, city_b, .. } => {
            println!("Cities: {} vs {}", city_a, city_b);
        }
        AnalysisRequest::FestivalPeriodAnalysis => {
            println!("Period: configured festival window");
        }
        AnalysisRequest::CapacityImpactAnalysis {
            client_name,
            order_volume,
        } => {
            println!("Client: {}", client_name.as_deref().unwrap_or("(unspecified)"));
            println!("Order volume: {}", order_volume);
        }
    }

    if let Some(time) = request.time_context() {
        print_time_context(time);
    }
}

fn print_time_context(time: &TimeContext) {
    println!("Time expression: {}", time.time_expression);
    println!("Time range: {}", time.time_range);
    for warning in &time.time_validation.warnings {
        println!("Warning: {}", warning);
    }
}

/// Print the supported query examples.
pub fn print_examples(examples: &[SupportedQuery], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(examples).unwrap());
    } else {
        println!("Supported questions:\n");
        for example in examples {
            println!("{}", example.query_type.display_name());
            println!("  {}", example.description);
            println!("  e.g. \"{}\"", example.example);
            println!();
        }
    }
}

/// Print a resolved time expression.
pub fn print_parsed_time(result: &ParsedTime, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
        return;
    }

    let validation = &result.validation;
    println!("Expression: {}", result.expression);
    println!("Requested: {} .. {}", result.requested.start, result.requested.end);
    println!(
        "Adjusted: {} .. {}",
        validation.adjusted_start, validation.adjusted_end
    );
    println!(
        "Data available: {} .. {}",
        validation.bounds.earliest, validation.bounds.latest
    );
    println!("Valid: {}", validation.valid);
    for warning in &validation.warnings {
        println!("Warning: {}", warning);
    }
    for suggestion in &validation.suggestions {
        println!("Suggestion: {}", suggestion);
    }
}
