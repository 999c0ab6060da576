//! End-to-end question answering.
//!
//! [`InsightInterface`] ties the pieces together: the question is interpreted
//! by the [`QueryProcessor`], routed to the analysis backend, optionally
//! rewritten, and recorded in the bounded query history.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::history::{QueryHistory, QueryHistoryRecord, QueryStatistics};
use crate::query::{
    AnalysisRequest, QueryProcessor, QueryType, SupportedQuery, TimeExpressionParser,
};
use crate::router::{AnalysisBackend, AnalysisRouter, EntityDirectory, RewriteStats};

/// The answer to one question.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub query: String,
    pub query_type: QueryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<AnalysisRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_queries: Vec<String>,
    /// Time-range warnings worth surfacing to the user.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub rewritten: bool,
    pub processing_time_ms: u64,
    pub timestamp: NaiveDateTime,
}

/// Answers logistics questions end to end.
pub struct InsightInterface {
    processor: QueryProcessor,
    router: AnalysisRouter,
    history: Mutex<QueryHistory>,
}

impl InsightInterface {
    pub fn new(processor: QueryProcessor, router: AnalysisRouter, history_capacity: usize) -> Self {
        Self {
            processor,
            router,
            history: Mutex::new(QueryHistory::new(history_capacity)),
        }
    }

    /// Build an interface from configuration and the two data collaborators.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn AnalysisBackend>,
        directory: Arc<dyn EntityDirectory>,
    ) -> Result<Self> {
        config.validate()?;
        let processor = QueryProcessor::with_parser(TimeExpressionParser::new(config.data.bounds()));
        let router = AnalysisRouter::from_config(config, backend, directory)?;
        Ok(Self::new(processor, router, config.history.capacity))
    }

    pub fn processor(&self) -> &QueryProcessor {
        &self.processor
    }

    pub fn router(&self) -> &AnalysisRouter {
        &self.router
    }

    /// Answer a question. Failures are reported in the response, never raised.
    pub async fn ask(&self, query: &str) -> QueryResponse {
        let start = Instant::now();
        info!(query = %query, "Processing query");

        let extracted = self.processor.process(query);
        let query_type = extracted.query_type();

        let mut response = QueryResponse {
            success: false,
            query: query.to_string(),
            query_type,
            request: extracted.as_request().cloned(),
            narrative: None,
            error: None,
            supported_queries: extracted.supported_queries().to_vec(),
            warnings: Vec::new(),
            rewritten: false,
            processing_time_ms: 0,
            timestamp: Local::now().naive_local(),
        };

        match extracted.as_request() {
            None => {
                response.error = extracted.error().map(ToString::to_string);
            }
            Some(request) => {
                if let Some(time) = request.time_context() {
                    response.warnings = time.time_validation.warnings.clone();
                }

                match self.router.dispatch(request).await {
                    Ok(routed) => {
                        response.success = true;
                        response.narrative = Some(routed.narrative);
                        response.rewritten = routed.rewritten;
                    }
                    Err(e) => {
                        warn!(query = %query, error = %e, "Analysis failed");
                        response.error = Some(match e {
                            InsightError::Query(err) => err.to_string(),
                            other => other.to_string(),
                        });
                    }
                }
            }
        }

        self.history.lock().push(QueryHistoryRecord::new(
            query,
            Some(query_type),
            response.request.clone(),
            response.success,
        ));

        response.processing_time_ms = start.elapsed().as_millis() as u64;
        response
    }

    pub fn statistics(&self) -> QueryStatistics {
        self.history.lock().statistics()
    }

    /// All retained history records, oldest first.
    pub fn history(&self) -> Vec<QueryHistoryRecord> {
        self.history.lock().records().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn rewrite_stats(&self) -> RewriteStats {
        self.router.rewrite_stats()
    }

    pub fn supported_queries(&self) -> &'static [SupportedQuery] {
        QueryProcessor::supported_query_examples()
    }
}
