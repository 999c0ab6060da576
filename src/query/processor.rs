//! Query processing: classification plus parameter extraction.

use tracing::{debug, info};

use super::classifier::IntentClassifier;
use super::extractor::ParameterExtractor;
use super::temporal::TimeExpressionParser;
use super::types::*;

/// The canonical phrasing for each supported query type, in priority order.
pub const SUPPORTED_QUERIES: [SupportedQuery; 6] = [
    SupportedQuery {
        query_type: QueryType::CityDelayAnalysis,
        example: "Why were deliveries delayed in Mumbai yesterday?",
        description: "Analyzes delivery delays in a specific city for a given date",
    },
    SupportedQuery {
        query_type: QueryType::ClientFailureAnalysis,
        example: "Why did Client ABC's orders fail in the past week?",
        description: "Examines order failure patterns for a specific client over a time period",
    },
    SupportedQuery {
        query_type: QueryType::WarehouseFailureAnalysis,
        example: "Explain top reasons for delivery failures linked to Warehouse B in August?",
        description: "Analyzes warehouse-related delivery failures and operational issues",
    },
    SupportedQuery {
        query_type: QueryType::CityComparison,
        example: "Compare delivery failure causes between Delhi and Mumbai last month?",
        description: "Compares delivery performance and failure patterns between two cities",
    },
    SupportedQuery {
        query_type: QueryType::FestivalPeriodAnalysis,
        example: "What are the likely causes of delivery failures during the festival period?",
        description: "Analyzes seasonal delivery risks and preparation strategies",
    },
    SupportedQuery {
        query_type: QueryType::CapacityImpactAnalysis,
        example: "If we onboard Client XYZ with 20,000 extra monthly orders, what new failure risks should we expect?",
        description: "Evaluates capacity impact and risks from onboarding high-volume clients",
    },
];

/// Turns a free-text question into an [`ExtractedQuery`].
///
/// Holds no state besides its time parser, so one processor can serve any
/// number of questions, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct QueryProcessor {
    classifier: IntentClassifier,
    extractor: ParameterExtractor,
}

impl QueryProcessor {
    /// Create a processor that validates time ranges against `bounds`.
    pub fn new(bounds: DataBounds) -> Self {
        Self::with_parser(TimeExpressionParser::new(bounds))
    }

    /// Create a processor around a preconfigured time parser.
    pub fn with_parser(parser: TimeExpressionParser) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            extractor: ParameterExtractor::new(parser),
        }
    }

    pub fn parser(&self) -> &TimeExpressionParser {
        self.extractor.parser()
    }

    /// Classify a question without extracting parameters.
    pub fn classify(&self, query: &str) -> QueryType {
        self.classifier.classify(query)
    }

    /// Interpret a question. Never fails: problems are reported in the result.
    pub fn process(&self, query: &str) -> ExtractedQuery {
        let query_type = self.classifier.classify(query);

        if query_type == QueryType::Unknown {
            info!(query = %query, "Unrecognized query");
            return ExtractedQuery::failure(
                query,
                QueryFailure {
                    query_type,
                    error: crate::error::QueryError::UnrecognizedIntent,
                    supported_queries: Self::supported_queries(),
                },
            );
        }

        match self.extractor.extract(query, query_type) {
            Ok(request) => {
                debug!(query_type = %query_type, "Extracted query parameters");
                ExtractedQuery::request(query, request)
            }
            Err(error) => {
                info!(query = %query, error = %error, "Could not extract query parameters");
                ExtractedQuery::failure(
                    query,
                    QueryFailure {
                        query_type,
                        error,
                        supported_queries: Vec::new(),
                    },
                )
            }
        }
    }

    /// Example phrasing and description for each supported query type.
    pub fn supported_query_examples() -> &'static [SupportedQuery] {
        &SUPPORTED_QUERIES
    }

    /// The example phrasings alone, as shown when a question is not understood.
    pub fn supported_queries() -> Vec<String> {
        SUPPORTED_QUERIES
            .iter()
            .map(|supported| supported.example.to_string())
            .collect()
    }
}
