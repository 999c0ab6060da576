//! Error types for the logistics insight system.

use thiserror::Error;

use crate::query::QueryType;

/// Main error type for logistics insight operations.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Narrative error: {0}")]
    Narrative(#[from] NarrativeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Recoverable failures while interpreting or routing a user query.
///
/// Every variant carries a message that can be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Could not identify query type. Please rephrase your question.")]
    UnrecognizedIntent,

    #[error("Could not extract {} parameters", .0.parameter_kind())]
    MissingEntity(QueryType),

    #[error("Could not find {entity} with name '{name}'")]
    UnresolvableName { entity: &'static str, name: String },

    #[error("Missing required parameters ({fields}) for {}", .query_type.parameter_kind())]
    MissingParameters {
        query_type: QueryType,
        fields: String,
    },
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Narrative rewriting errors.
#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Timeout after {0}s")]
    Timeout(u64),

    #[error("Empty response from provider")]
    EmptyResponse,
}

/// Result type alias for logistics insight operations.
pub type Result<T> = std::result::Result<T, InsightError>;
