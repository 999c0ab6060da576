//! Narrative rewriting for analysis output.
//!
//! Analysis backends produce plain report text. A [`NarrativeRewriter`] may
//! restyle that text for business readers; it never changes which facts were
//! computed, and callers fall back to the original text when it fails.
//!
//! # Providers
//!
//! - [`TemplateRewriter`]: local rule-based formatting, no network access.
//! - [`HttpRewriter`]: OpenAI-compatible chat completions. Works with OpenAI
//!   and with Ollama through its `/v1` endpoint.

mod http;
mod template;

pub use http::HttpRewriter;
pub use template::TemplateRewriter;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{NarrativeConfig, NarrativeProvider};
use crate::error::{NarrativeError, Result};

/// Trait for narrative rewriters.
#[async_trait]
pub trait NarrativeRewriter: Send + Sync {
    /// Short provider name for logs and responses.
    fn name(&self) -> &str;

    /// Rewrite `narrative`. `context` describes the query that produced it.
    async fn rewrite(
        &self,
        narrative: &str,
        context: &serde_json::Value,
    ) -> std::result::Result<String, NarrativeError>;
}

/// Create a rewriter from configuration, or `None` when rewriting is disabled.
pub fn create_rewriter(config: &NarrativeConfig) -> Result<Option<Arc<dyn NarrativeRewriter>>> {
    if !config.enabled {
        return Ok(None);
    }

    let rewriter: Arc<dyn NarrativeRewriter> = match config.provider {
        NarrativeProvider::RuleBased => Arc::new(TemplateRewriter::new()),
        NarrativeProvider::OpenAi | NarrativeProvider::Ollama => {
            Arc::new(HttpRewriter::from_config(config)?)
        }
    };

    tracing::info!(provider = rewriter.name(), "Narrative rewriting enabled");
    Ok(Some(rewriter))
}
