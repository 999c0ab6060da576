//! Analysis routing.
//!
//! The [`AnalysisRouter`] takes a typed [`AnalysisRequest`], checks its
//! required fields, resolves client and warehouse names to identifiers, and
//! dispatches to the matching [`AnalysisBackend`] method. The resulting
//! narrative can optionally be restyled by a [`NarrativeRewriter`]; rewriting
//! is bounded by a timeout and any failure keeps the original text.

mod backend;
mod directory;

pub use backend::AnalysisBackend;
pub use directory::{resolve_by_name, EntityDirectory, EntityKind, InMemoryDirectory, NamedEntity};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, FestivalConfig};
use crate::error::{QueryError, Result};
use crate::narrative::{create_rewriter, NarrativeRewriter};
use crate::query::{AnalysisRequest, EntityRef, QueryType, TimeRange};

/// Client name used for capacity analyses that do not name one.
pub const DEFAULT_CLIENT_NAME: &str = "New Client";

const DEFAULT_REWRITE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Routed Output
// ============================================================================

/// Narrative produced for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedAnalysis {
    pub narrative: String,
    /// Whether a rewriter restyled the backend's text.
    pub rewritten: bool,
}

/// Counters for narrative rewriting attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub requests: u64,
    pub successful: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct RewriteCounters {
    requests: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
}

// ============================================================================
// Analysis Router
// ============================================================================

/// Dispatches analysis requests to the backend.
pub struct AnalysisRouter {
    backend: Arc<dyn AnalysisBackend>,
    directory: Arc<dyn EntityDirectory>,
    rewriter: Option<Arc<dyn NarrativeRewriter>>,
    festival_period: TimeRange,
    rewrite_timeout: Duration,
    counters: RewriteCounters,
}

impl AnalysisRouter {
    /// Create a router with the default festival period and no rewriter.
    pub fn new(backend: Arc<dyn AnalysisBackend>, directory: Arc<dyn EntityDirectory>) -> Self {
        Self {
            backend,
            directory,
            rewriter: None,
            festival_period: FestivalConfig::default().period(),
            rewrite_timeout: DEFAULT_REWRITE_TIMEOUT,
            counters: RewriteCounters::default(),
        }
    }

    /// Create a router configured from `config`, including its rewriter.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn AnalysisBackend>,
        directory: Arc<dyn EntityDirectory>,
    ) -> Result<Self> {
        let mut router = Self::new(backend, directory)
            .with_festival_period(config.festival.period())
            .with_rewrite_timeout(Duration::from_secs(config.narrative.timeout_secs));
        router.rewriter = create_rewriter(&config.narrative)?;
        Ok(router)
    }

    pub fn with_rewriter(mut self, rewriter: Arc<dyn NarrativeRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    pub fn with_festival_period(mut self, period: TimeRange) -> Self {
        self.festival_period = period;
        self
    }

    pub fn with_rewrite_timeout(mut self, timeout: Duration) -> Self {
        self.rewrite_timeout = timeout;
        self
    }

    pub fn festival_period(&self) -> TimeRange {
        self.festival_period
    }

    /// Name of the configured rewriter, if any.
    pub fn rewriter_name(&self) -> Option<&str> {
        self.rewriter.as_deref().map(|r| r.name())
    }

    pub fn rewrite_stats(&self) -> RewriteStats {
        RewriteStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            successful: self.counters.successful.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Route a request to the backend and optionally rewrite the result.
    pub async fn dispatch(&self, request: &AnalysisRequest) -> Result<RoutedAnalysis> {
        let narrative = self.route(request).await?;
        let (narrative, rewritten) = self.rewrite(narrative, request).await;
        Ok(RoutedAnalysis {
            narrative,
            rewritten,
        })
    }

    /// Validate, resolve and dispatch a request, returning the backend's text.
    pub async fn route(&self, request: &AnalysisRequest) -> Result<String> {
        info!(query_type = %request.query_type(), "Routing analysis request");

        match request {
            AnalysisRequest::CityDelayAnalysis { city, date, time } => {
                require(!city.trim().is_empty(), QueryType::CityDelayAnalysis, "city, date")?;
                self.backend.city_delays(city, *date, &time.time_range).await
            }
            AnalysisRequest::ClientFailureAnalysis { client, time } => {
                let client_id = self.resolve(client, EntityKind::Client, QueryType::ClientFailureAnalysis)?;
                self.backend.client_failures(client_id, &time.time_range).await
            }
            AnalysisRequest::WarehouseFailureAnalysis { warehouse, time } => {
                let warehouse_id =
                    self.resolve(warehouse, EntityKind::Warehouse, QueryType::WarehouseFailureAnalysis)?;
                self.backend
                    .warehouse_failures(warehouse_id, &time.time_range)
                    .await
            }
            AnalysisRequest::CityComparison {
                city_a,
                city_b,
                time,
            } => {
                require(
                    !city_a.trim().is_empty() && !city_b.trim().is_empty(),
                    QueryType::CityComparison,
                    "city_a, city_b",
                )?;
                self.backend
                    .compare_cities(city_a, city_b, &time.time_range)
                    .await
            }
            AnalysisRequest::FestivalPeriodAnalysis => {
                self.backend.festival_period(&self.festival_period).await
            }
            AnalysisRequest::CapacityImpactAnalysis {
                client_name,
                order_volume,
            } => {
                require(*order_volume > 0, QueryType::CapacityImpactAnalysis, "order_volume")?;
                let client_name = client_name
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(DEFAULT_CLIENT_NAME);
                self.backend.capacity_impact(client_name, *order_volume).await
            }
        }
    }

    /// Restyle `narrative` with the configured rewriter.
    ///
    /// Returns the original text, and `false`, when there is no rewriter or
    /// the rewrite fails, times out or comes back empty.
    pub async fn rewrite(&self, narrative: String, request: &AnalysisRequest) -> (String, bool) {
        let Some(rewriter) = &self.rewriter else {
            return (narrative, false);
        };

        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        let context = serde_json::to_value(request).unwrap_or(serde_json::Value::Null);

        match tokio::time::timeout(self.rewrite_timeout, rewriter.rewrite(&narrative, &context)).await {
            Ok(Ok(rewritten)) if !rewritten.trim().is_empty() => {
                self.counters.successful.fetch_add(1, Ordering::Relaxed);
                (rewritten, true)
            }
            Ok(Ok(_)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(provider = rewriter.name(), "Rewriter returned empty text, keeping original");
                (narrative, false)
            }
            Ok(Err(e)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(provider = rewriter.name(), error = %e, "Narrative rewrite failed, keeping original");
                (narrative, false)
            }
            Err(_) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    provider = rewriter.name(),
                    timeout_secs = self.rewrite_timeout.as_secs(),
                    "Narrative rewrite timed out, keeping original"
                );
                (narrative, false)
            }
        }
    }

    fn resolve(&self, entity: &EntityRef, kind: EntityKind, query_type: QueryType) -> Result<u64> {
        match entity {
            EntityRef::Id(id) => Ok(*id),
            EntityRef::Name(name) => {
                let fields = format!("{kind}_id or {kind}_name");
                require(!name.trim().is_empty(), query_type, &fields)?;

                self.directory.resolve(kind, name).ok_or_else(|| {
                    QueryError::UnresolvableName {
                        entity: kind.as_str(),
                        name: name.clone(),
                    }
                    .into()
                })
            }
        }
    }
}

fn require(present: bool, query_type: QueryType, fields: &str) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(QueryError::MissingParameters {
            query_type,
            fields: fields.to_string(),
        }
        .into())
    }
}
