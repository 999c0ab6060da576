//! Query Intent Classifier.
//!
//! Maps a logistics question onto one of the six supported analyses using
//! ordered groups of phrasing patterns. Groups are checked in a fixed order
//! and the first group with a matching pattern wins, so a question that could
//! read as two analyses always resolves the same way.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::types::QueryType;

// ============================================================================
// Intent Classifier
// ============================================================================

/// Classifies natural language questions into a [`QueryType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a question. Returns [`QueryType::Unknown`] when no group matches.
    pub fn classify(&self, query: &str) -> QueryType {
        let query_lower = query.to_lowercase();

        let query_type = QueryType::SUPPORTED
            .into_iter()
            .find(|query_type| {
                patterns_for(*query_type)
                    .iter()
                    .any(|pattern| pattern.is_match(&query_lower))
            })
            .unwrap_or(QueryType::Unknown);

        debug!(query = %query, query_type = %query_type, "Classified query");
        query_type
    }

    /// Every supported type whose patterns match, in priority order.
    ///
    /// Useful for spotting questions that sit on the boundary of two analyses.
    pub fn candidates(&self, query: &str) -> Vec<QueryType> {
        let query_lower = query.to_lowercase();
        QueryType::SUPPORTED
            .into_iter()
            .filter(|query_type| {
                patterns_for(*query_type)
                    .iter()
                    .any(|pattern| pattern.is_match(&query_lower))
            })
            .collect()
    }
}

/// The phrasing patterns for a query type (empty for `Unknown`).
pub(crate) fn patterns_for(query_type: QueryType) -> &'static [Regex] {
    match query_type {
        QueryType::CityDelayAnalysis => CITY_DELAY_PATTERNS.as_slice(),
        QueryType::ClientFailureAnalysis => CLIENT_FAILURE_PATTERNS.as_slice(),
        QueryType::WarehouseFailureAnalysis => WAREHOUSE_FAILURE_PATTERNS.as_slice(),
        QueryType::CityComparison => CITY_COMPARISON_PATTERNS.as_slice(),
        QueryType::FestivalPeriodAnalysis => FESTIVAL_PERIOD_PATTERNS.as_slice(),
        QueryType::CapacityImpactAnalysis => CAPACITY_IMPACT_PATTERNS.as_slice(),
        QueryType::Unknown => &[],
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("Invalid regex"))
        .collect()
}

// ============================================================================
// Regex Patterns
// ============================================================================

static CITY_DELAY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"why\s+were\s+deliveries\s+delayed\s+in\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"what\s+caused\s+delays\s+in\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"analyze\s+delays\s+in\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"delivery\s+delays?\s+in\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
    ])
});

static CLIENT_FAILURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"why\s+did\s+client\s+([a-zA-Z0-9\s]+?)(?:'s)?\s+orders?\s+fail(?:\s+.+?)?(?:\?|$)",
        r"what\s+caused\s+client\s+([a-zA-Z0-9\s]+?)(?:'s)?\s+(?:order\s+)?failures?(?:\s+.+?)?(?:\?|$)",
        r"analyze\s+client\s+([a-zA-Z0-9\s]+?)(?:'s)?\s+(?:order\s+)?failures?(?:\s+.+?)?(?:\?|$)",
        r"client\s+([a-zA-Z0-9\s]+?)\s+(?:order\s+)?failure\s+analysis(?:\s+.+?)?(?:\?|$)",
    ])
});

static WAREHOUSE_FAILURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"explain\s+(?:the\s+)?top\s+reasons?\s+for\s+delivery\s+failures?\s+linked\s+to\s+warehouse\s+([a-zA-Z0-9\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"what\s+are\s+the\s+main\s+failure\s+causes?\s+for\s+warehouse\s+([a-zA-Z0-9\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"analyze\s+(?:delivery\s+)?failures?\s+(?:from\s+|for\s+)?warehouse\s+([a-zA-Z0-9\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"warehouse\s+([a-zA-Z0-9\s]+?)\s+failure\s+analysis(?:\s+.+?)?(?:\?|$)",
    ])
});

/// Also used by the extractor: groups 1 and 2 are the two city names.
pub(crate) static CITY_COMPARISON_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"compare\s+delivery\s+failure\s+causes?\s+between\s+(?:city\s+)?([a-zA-Z\s]+?)\s+and\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"what\s+are\s+the\s+differences?\s+in\s+failures?\s+between\s+(?:city\s+)?([a-zA-Z\s]+?)\s+and\s+(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"analyze\s+(?:delivery\s+)?(?:failure\s+)?differences?\s+between\s+(?:city\s+)?([a-zA-Z\s]+?)\s+(?:and\s+|vs\s+)(?:city\s+)?([a-zA-Z\s]+?)(?:\s+.+?)?(?:\?|$)",
        r"(?:city\s+)?([a-zA-Z\s]+?)\s+vs\s+(?:city\s+)?([a-zA-Z\s]+?)\s+(?:delivery\s+)?(?:failure\s+)?comparison(?:\s+.+?)?(?:\?|$)",
    ])
});

static FESTIVAL_PERIOD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"what\s+are\s+the\s+likely\s+causes?\s+of\s+delivery\s+failures?\s+during\s+(?:the\s+)?festival\s+period",
        r"analyze\s+(?:delivery\s+)?failures?\s+during\s+(?:the\s+)?(?:festival|holiday)\s+(?:period|season)",
        r"how\s+should\s+we\s+prepare\s+for\s+(?:the\s+)?festival\s+(?:period|season)",
        r"festival\s+(?:period|season)\s+(?:delivery\s+)?failure\s+analysis",
        r"seasonal\s+(?:delivery\s+)?(?:failure\s+)?analysis\s+(?:for\s+)?(?:festival|holiday)",
    ])
});

static CAPACITY_IMPACT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"if\s+we\s+onboard\s+client\s+.+?\s+with\s+.+?\s+orders?",
        r"what\s+(?:new\s+)?failure\s+risks?\s+.+?\s+orders?",
        r"analyze\s+(?:the\s+)?impact\s+of\s+.+?\s+orders?",
        r"capacity\s+impact\s+analysis\s+.+?\s+orders?",
    ])
});

// ============================================================================
// Tests
// ============================================================================
