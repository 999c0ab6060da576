//! Parameter extraction for classified queries.
//!
//! Each query type has its own extractor that pulls typed entities out of the
//! question text. Time-bearing analyses share a scanner that finds the first
//! time phrase in the question and resolves it through the
//! [`TimeExpressionParser`], clamped to the known data bounds.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::classifier::CITY_COMPARISON_PATTERNS;
use super::temporal::TimeExpressionParser;
use super::types::*;
use crate::error::QueryError;

/// Phrase used when a question carries no recognizable time expression.
pub const DEFAULT_TIME_EXPRESSION: &str = "last month";

// ============================================================================
// Parameter Extractor
// ============================================================================

/// Extracts typed analysis parameters from question text.
#[derive(Debug, Clone, Default)]
pub struct ParameterExtractor {
    parser: TimeExpressionParser,
}

impl ParameterExtractor {
    pub fn new(parser: TimeExpressionParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &TimeExpressionParser {
        &self.parser
    }

    /// Build the analysis request for an already classified question.
    ///
    /// Fails with [`QueryError::MissingEntity`] when a required entity is
    /// absent, or [`QueryError::UnrecognizedIntent`] for `Unknown`.
    pub fn extract(&self, query: &str, query_type: QueryType) -> Result<AnalysisRequest, QueryError> {
        let query_lower = query.to_lowercase();

        match query_type {
            QueryType::CityDelayAnalysis => self.extract_city_delay(&query_lower),
            QueryType::ClientFailureAnalysis => self.extract_client_failure(&query_lower),
            QueryType::WarehouseFailureAnalysis => self.extract_warehouse_failure(&query_lower),
            QueryType::CityComparison => self.extract_city_comparison(&query_lower),
            QueryType::FestivalPeriodAnalysis => Ok(AnalysisRequest::FestivalPeriodAnalysis),
            QueryType::CapacityImpactAnalysis => extract_capacity_impact(&query_lower),
            QueryType::Unknown => Err(QueryError::UnrecognizedIntent),
        }
    }

    /// Scan a question for its time phrase and resolve it against the data bounds.
    pub fn time_context(&self, query: &str) -> TimeContext {
        let query_lower = query.to_lowercase();
        let expression = scan_time_expression(&query_lower).unwrap_or(DEFAULT_TIME_EXPRESSION);
        debug!(expression = %expression, "Matched time expression");

        let requested = self.parser.parse(expression);
        let validation = self.parser.validate(&requested);

        TimeContext {
            time_range: validation.adjusted_range(),
            time_expression: expression.to_string(),
            time_validation: validation,
        }
    }

    // ========================================================================
    // Per-Type Extractors
    // ========================================================================

    fn extract_city_delay(&self, query: &str) -> Result<AnalysisRequest, QueryError> {
        let city = first_capture(&CITY_PATTERNS, query)
            .ok_or(QueryError::MissingEntity(QueryType::CityDelayAnalysis))?;
        let time = self.time_context(query);

        Ok(AnalysisRequest::CityDelayAnalysis {
            city: title_case(&city),
            date: time.time_range.start,
            time,
        })
    }

    fn extract_client_failure(&self, query: &str) -> Result<AnalysisRequest, QueryError> {
        let client = first_capture(&CLIENT_PATTERNS, query)
            .and_then(|client| EntityRef::parse(&client))
            .ok_or(QueryError::MissingEntity(QueryType::ClientFailureAnalysis))?;

        Ok(AnalysisRequest::ClientFailureAnalysis {
            client,
            time: self.time_context(query),
        })
    }

    fn extract_warehouse_failure(&self, query: &str) -> Result<AnalysisRequest, QueryError> {
        let warehouse = first_capture(&WAREHOUSE_PATTERNS, query)
            .and_then(|warehouse| EntityRef::parse(&warehouse))
            .ok_or(QueryError::MissingEntity(QueryType::WarehouseFailureAnalysis))?;

        Ok(AnalysisRequest::WarehouseFailureAnalysis {
            warehouse,
            time: self.time_context(query),
        })
    }

    fn extract_city_comparison(&self, query: &str) -> Result<AnalysisRequest, QueryError> {
        let (city_a, city_b) = CITY_COMPARISON_PATTERNS
            .iter()
            .filter_map(|pattern| pattern.captures(query))
            .find_map(|caps| {
                let a = caps.get(1)?.as_str().trim();
                let b = caps.get(2)?.as_str().trim();
                (!a.is_empty() && !b.is_empty()).then(|| (title_case(a), title_case(b)))
            })
            .ok_or(QueryError::MissingEntity(QueryType::CityComparison))?;

        Ok(AnalysisRequest::CityComparison {
            city_a,
            city_b,
            time: self.time_context(query),
        })
    }
}

fn extract_capacity_impact(query: &str) -> Result<AnalysisRequest, QueryError> {
    let client_name = first_capture(&CAPACITY_CLIENT_PATTERNS, query).map(|name| title_case(&name));

    let order_volume = ORDER_VOLUME_PATTERN
        .captures(query)
        .and_then(|caps| caps[1].replace(',', "").parse::<u64>().ok())
        .filter(|volume| *volume > 0)
        .ok_or(QueryError::MissingEntity(QueryType::CapacityImpactAnalysis))?;

    Ok(AnalysisRequest::CapacityImpactAnalysis {
        client_name,
        order_volume,
    })
}

/// First non-empty group-1 capture across `patterns`, trimmed.
fn first_capture(patterns: &[Regex], query: &str) -> Option<String> {
    patterns
        .iter()
        .filter_map(|pattern| pattern.captures(query))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|value| !value.is_empty())
}

// ============================================================================
// Time Phrase Scanner
// ============================================================================

/// Find the time phrase in a lowercased question.
///
/// Alternatives are tried from most to least specific and the first one that
/// matches anywhere in the text wins, regardless of where other phrases sit.
pub fn scan_time_expression(query: &str) -> Option<&str> {
    TIME_PHRASE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(query))
        .map(|m| m.as_str())
}

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static TIME_PHRASE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let month = format!("(?:{})", MONTH_NAMES);
    let unit = "(?:days?|weeks?|months?|years?)";
    let ordinal = "(?:first|second|third|fourth)";

    [
        // Explicit month ranges
        format!(r"\b{m}\s+to\s+{m}(?:\s+\d{{4}})?\b", m = month),
        format!(r"\b{m}\s+-\s+{m}(?:\s+\d{{4}})?\b", m = month),
        format!(r"\bbetween\s+{m}\s+and\s+{m}(?:\s+\d{{4}})?\b", m = month),
        format!(r"\bfrom\s+{m}\s+to\s+{m}(?:\s+\d{{4}})?\b", m = month),
        // Relative
        format!(r"\b\d+\s+{u}\s+(?:ago|back)\b", u = unit),
        format!(r"\bpast\s+\d+\s+{u}\b", u = unit),
        format!(r"\blast\s+\d+\s+{u}\b", u = unit),
        format!(r"\bprevious\s+\d+\s+{u}\b", u = unit),
        // Quarters with year
        r"\bq[1-4]\s+\d{4}\b".to_string(),
        r"\bquarter\s+[1-4]\s+\d{4}\b".to_string(),
        format!(r"\b{o}\s+quarter\s+\d{{4}}\b", o = ordinal),
        // Bare quarters
        r"\bq[1-4]\b".to_string(),
        r"\bquarter\s+[1-4]\b".to_string(),
        format!(r"\b{o}\s+quarter\b", o = ordinal),
        // Month and year
        format!(r"\b{m}\s+\d{{4}}\b", m = month),
        // Specific dates
        r"\b\d{4}-\d{1,2}-\d{1,2}\b".to_string(),
        r"\b\d{4}/\d{1,2}/\d{1,2}\b".to_string(),
        r"\b\d{1,2}/\d{1,2}/\d{4}\b".to_string(),
        r"\b\d{1,2}-\d{1,2}-\d{4}\b".to_string(),
        // Bare year
        r"\b(?:19|20)\d{2}\b".to_string(),
        // Bare month
        format!(r"\b{m}\b", m = month),
        // Special words
        r"\byesterday\b".to_string(),
        r"\blast\s+week\b".to_string(),
        r"\bpast\s+week\b".to_string(),
        r"\blast\s+month\b".to_string(),
        r"\bpast\s+month\b".to_string(),
        r"\blast\s+year\b".to_string(),
        r"\bpast\s+year\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

// ============================================================================
// Entity Patterns
// ============================================================================

static CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:in|for)\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?|\s*\?|$)",
        r"delayed\s+in\s+([a-zA-Z\s]+?)(?:\s+.+?|\s*\?|$)",
        r"delays\s+in\s+([a-zA-Z\s]+?)(?:\s+.+?|\s*\?|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static CLIENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"client\s+([a-zA-Z0-9\s]+?)(?:'s|\s+orders?|\s+order\s+|\s+failure|\s+fail|\s*\?|$)",
        r"(?:did|caused)\s+client\s+([a-zA-Z0-9\s]+?)(?:'s|\s+orders?|\s+failure|\s*\?|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static WAREHOUSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"warehouse\s+([a-zA-Z0-9\s]+?)(?:\s+in\s+|\s+failure|\s*\?|$)",
        r"(?:to|for|from)\s+warehouse\s+([a-zA-Z0-9\s]+?)(?:\s+in\s+|\s+failure|\s*\?|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static CAPACITY_CLIENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"client\s+([a-zA-Z0-9\s]+?)(?:\s+with|\s*\?|$)").expect("Invalid regex")]
});

static ORDER_VOLUME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:~|approximately\s+|about\s+)?([0-9,]+)\s+(?:extra\s+|additional\s+|new\s+)?(?:monthly\s+)?orders?",
    )
    .expect("Invalid regex")
});

// ============================================================================
// Tests
// ============================================================================
