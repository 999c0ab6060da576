//! The analysis collaborator the router dispatches to.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::query::TimeRange;

/// Computes an analysis and renders it as report text.
///
/// Implementations own data loading, aggregation and correlation. Each method
/// receives fully resolved parameters and returns the narrative to show.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Delays in one city around `date`, within `range`.
    async fn city_delays(&self, city: &str, date: NaiveDateTime, range: &TimeRange) -> Result<String>;

    async fn client_failures(&self, client_id: u64, range: &TimeRange) -> Result<String>;

    async fn warehouse_failures(&self, warehouse_id: u64, range: &TimeRange) -> Result<String>;

    async fn compare_cities(&self, city_a: &str, city_b: &str, range: &TimeRange) -> Result<String>;

    async fn festival_period(&self, period: &TimeRange) -> Result<String>;

    /// Risks of taking on `order_volume` extra monthly orders from a client.
    async fn capacity_impact(&self, client_name: &str, order_volume: u64) -> Result<String>;
}
