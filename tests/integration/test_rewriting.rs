//! Narrative rewriting through the full pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use logistics_insight::{
    AnalysisRouter, Config, InsightInterface, NarrativeError, NarrativeRewriter, RewriteStats,
};

use crate::common::{directory, processor, RecordingBackend};

const QUERY: &str = "Why were deliveries delayed in Mumbai yesterday?";

struct SlowRewriter;

#[async_trait]
impl NarrativeRewriter for SlowRewriter {
    fn name(&self) -> &str {
        "slow"
    }

    async fn rewrite(
        &self,
        narrative: &str,
        _context: &serde_json::Value,
    ) -> Result<String, NarrativeError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(narrative.to_uppercase())
    }
}

/// Echoes the query type it was given so the context can be checked.
struct ContextRewriter;

#[async_trait]
impl NarrativeRewriter for ContextRewriter {
    fn name(&self) -> &str {
        "context"
    }

    async fn rewrite(
        &self,
        narrative: &str,
        context: &serde_json::Value,
    ) -> Result<String, NarrativeError> {
        Ok(format!("[{}] {}", context["query_type"], narrative))
    }
}

fn interface_with_rewriter(rewriter: Arc<dyn NarrativeRewriter>, timeout: Duration) -> InsightInterface {
    let router = AnalysisRouter::new(Arc::new(RecordingBackend::default()), Arc::new(directory()))
        .with_rewriter(rewriter)
        .with_rewrite_timeout(timeout);
    InsightInterface::new(processor(), router, 100)
}

#[tokio::test]
async fn test_rule_based_rewriter_from_config() {
    let config = Config::from_str(
        r#"
[narrative]
enabled = true
provider = "rule_based"
"#,
    )
    .unwrap();

    let interface = InsightInterface::from_config(
        &config,
        Arc::new(RecordingBackend::default()),
        Arc::new(directory()),
    )
    .unwrap();
    assert_eq!(interface.router().rewriter_name(), Some("rule_based"));

    let response = interface.ask(QUERY).await;

    assert!(response.success, "{:?}", response.error);
    assert!(response.rewritten);
    let narrative = response.narrative.unwrap();
    assert!(narrative.contains("• city_delays Mumbai"));
    assert!(narrative.contains("**Business Impact Assessment:**"));
    assert_eq!(
        interface.rewrite_stats(),
        RewriteStats {
            requests: 1,
            successful: 1,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn test_rewriter_receives_request_context() {
    let interface = interface_with_rewriter(Arc::new(ContextRewriter), Duration::from_secs(5));

    let response = interface.ask(QUERY).await;

    assert!(response.rewritten);
    assert!(response
        .narrative
        .unwrap()
        .starts_with("[\"city_delay_analysis\"] Report"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_rewriter_times_out_to_original() {
    let interface = interface_with_rewriter(Arc::new(SlowRewriter), Duration::from_secs(1));

    let response = interface.ask(QUERY).await;

    assert!(response.success);
    assert!(!response.rewritten);
    assert_eq!(
        response.narrative.as_deref(),
        Some("Report\n- city_delays Mumbai 2025-09-09 [2025-09-09 to 2025-09-09]")
    );
    assert_eq!(interface.rewrite_stats().failed, 1);
}

#[tokio::test]
async fn test_unreachable_http_provider_keeps_original() {
    let config = Config::from_str(
        r#"
[narrative]
enabled = true
provider = "ollama"
base_url = "http://127.0.0.1:9/v1"
timeout_secs = 5
"#,
    )
    .unwrap();

    let interface = InsightInterface::from_config(
        &config,
        Arc::new(RecordingBackend::default()),
        Arc::new(directory()),
    )
    .unwrap();
    assert_eq!(interface.router().rewriter_name(), Some("ollama"));

    let response = interface
        .ask("What are the likely causes of delivery failures during the festival period?")
        .await;

    assert!(response.success, "{:?}", response.error);
    assert!(!response.rewritten);
    assert_eq!(
        response.narrative.as_deref(),
        Some("Report\n- festival_period [2025-10-20 to 2025-10-25]")
    );

    let stats = interface.rewrite_stats();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.failed, 1);
}
