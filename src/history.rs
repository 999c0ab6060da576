//! Bounded in-memory query history.

use std::collections::{BTreeMap, VecDeque};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::query::{AnalysisRequest, QueryType};

/// Default number of records kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Number of records included in [`QueryStatistics::recent_queries`].
const RECENT_QUERIES: usize = 10;

/// One processed question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryHistoryRecord {
    pub timestamp: NaiveDateTime,
    pub query_text: String,
    /// `None` when the question was not understood.
    pub query_type: Option<QueryType>,
    /// The extracted request, when extraction succeeded.
    pub parameters: Option<AnalysisRequest>,
    pub success: bool,
}

impl QueryHistoryRecord {
    pub fn new(
        query_text: impl Into<String>,
        query_type: Option<QueryType>,
        parameters: Option<AnalysisRequest>,
        success: bool,
    ) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            query_text: query_text.into(),
            query_type: query_type.filter(|t| *t != QueryType::Unknown),
            parameters,
            success,
        }
    }
}

/// Aggregate view over the retained history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStatistics {
    pub total_queries: usize,
    pub successful_queries: usize,
    /// Percentage of successful queries, rounded to two decimals.
    pub success_rate: f64,
    pub query_types: BTreeMap<QueryType, usize>,
    pub recent_queries: Vec<QueryHistoryRecord>,
}

/// Ring buffer of the most recent queries. Oldest records are evicted first.
#[derive(Debug, Clone)]
pub struct QueryHistory {
    records: VecDeque<QueryHistoryRecord>,
    capacity: usize,
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl QueryHistory {
    /// Create a history holding at most `capacity` records (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: QueryHistoryRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl Iterator<Item = &QueryHistoryRecord> {
        self.records.iter()
    }

    /// The newest `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<QueryHistoryRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn statistics(&self) -> QueryStatistics {
        let total_queries = self.records.len();
        let successful_queries = self.records.iter().filter(|r| r.success).count();

        let success_rate = if total_queries == 0 {
            0.0
        } else {
            let rate = successful_queries as f64 / total_queries as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        };

        let mut query_types = BTreeMap::new();
        for query_type in self.records.iter().filter_map(|r| r.query_type) {
            *query_types.entry(query_type).or_insert(0) += 1;
        }

        QueryStatistics {
            total_queries,
            successful_queries,
            success_rate,
            query_types,
            recent_queries: self.recent(RECENT_QUERIES),
        }
    }
}
