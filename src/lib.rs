//! Logistics Insight: natural-language query interpretation for delivery analytics.
//!
//! Free-text questions about deliveries ("Why were deliveries delayed in
//! Mumbai last week?") are classified into one of six analysis intents,
//! their parameters and time window are extracted, and the resulting
//! [`AnalysisRequest`] is routed to a pluggable analysis backend. The
//! backend's report can optionally be polished by a narrative rewriter.

pub mod config;
pub mod error;
pub mod history;
pub mod interface;
pub mod narrative;
pub mod query;
pub mod router;

pub use config::Config;
pub use error::{ConfigError, InsightError, NarrativeError, QueryError, Result};
pub use history::{QueryHistory, QueryHistoryRecord, QueryStatistics};
pub use interface::{InsightInterface, QueryResponse};
pub use narrative::{create_rewriter, HttpRewriter, NarrativeRewriter, TemplateRewriter};
pub use query::{
    AnalysisRequest, DataBounds, EntityRef, ExtractedQuery, IntentClassifier, ParameterExtractor,
    QueryProcessor, QueryType, SupportedQuery, TimeContext, TimeExpressionParser, TimeRange,
    TimeValidation,
};
pub use router::{
    AnalysisBackend, AnalysisRouter, EntityDirectory, EntityKind, InMemoryDirectory, NamedEntity,
    RewriteStats, RoutedAnalysis,
};
