//! Shared fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;

use logistics_insight::{
    AnalysisBackend, AnalysisRouter, DataBounds, InMemoryDirectory, InsightError, InsightInterface,
    QueryProcessor, Result, TimeExpressionParser, TimeRange,
};

pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Backend that records every call and echoes it back as the report.
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Mutex<Vec<String>>,
    /// When set, every call fails with this message.
    pub fail_with: Option<String>,
}

impl RecordingBackend {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> Result<String> {
        self.calls.lock().push(call.clone());
        match &self.fail_with {
            Some(message) => Err(InsightError::Analysis(message.clone())),
            None => Ok(format!("Report\n- {}", call)),
        }
    }
}

#[async_trait]
impl AnalysisBackend for RecordingBackend {
    async fn city_delays(&self, city: &str, date: NaiveDateTime, range: &TimeRange) -> Result<String> {
        self.record(format!("city_delays {} {} [{}]", city, date.date(), range))
    }

    async fn client_failures(&self, client_id: u64, range: &TimeRange) -> Result<String> {
        self.record(format!("client_failures {} [{}]", client_id, range))
    }

    async fn warehouse_failures(&self, warehouse_id: u64, range: &TimeRange) -> Result<String> {
        self.record(format!("warehouse_failures {} [{}]", warehouse_id, range))
    }

    async fn compare_cities(&self, city_a: &str, city_b: &str, range: &TimeRange) -> Result<String> {
        self.record(format!("compare_cities {} {} [{}]", city_a, city_b, range))
    }

    async fn festival_period(&self, period: &TimeRange) -> Result<String> {
        self.record(format!("festival_period [{}]", period))
    }

    async fn capacity_impact(&self, client_name: &str, order_volume: u64) -> Result<String> {
        self.record(format!("capacity_impact {} {}", client_name, order_volume))
    }
}

pub fn directory() -> InMemoryDirectory {
    InMemoryDirectory::default()
        .with_client(7, "ABC")
        .with_client(8, "Acme Logistics")
        .with_warehouse(3, "Warehouse B")
        .with_warehouse(4, "B")
}

/// Processor pinned to 2025-09-10 14:00 with 2025 data bounds.
pub fn processor() -> QueryProcessor {
    let reference = NaiveDate::from_ymd_opt(2025, 9, 10)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap();
    let bounds = DataBounds::new(at(2025, 1, 1), at(2025, 12, 31));
    QueryProcessor::with_parser(TimeExpressionParser::new(bounds).with_reference(reference))
}

pub fn interface_with(backend: Arc<RecordingBackend>, capacity: usize) -> InsightInterface {
    let router = AnalysisRouter::new(backend, Arc::new(directory()));
    InsightInterface::new(processor(), router, capacity)
}
