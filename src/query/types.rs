//! Types for the natural language query system.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::QueryError;

// ============================================================================
// Query Type
// ============================================================================

/// The closed set of analyses a query can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    CityDelayAnalysis,
    ClientFailureAnalysis,
    WarehouseFailureAnalysis,
    CityComparison,
    FestivalPeriodAnalysis,
    CapacityImpactAnalysis,
    Unknown,
}

impl QueryType {
    /// Supported query types, in classification priority order.
    pub const SUPPORTED: [QueryType; 6] = [
        QueryType::CityDelayAnalysis,
        QueryType::ClientFailureAnalysis,
        QueryType::WarehouseFailureAnalysis,
        QueryType::CityComparison,
        QueryType::FestivalPeriodAnalysis,
        QueryType::CapacityImpactAnalysis,
    ];

    /// Stable snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CityDelayAnalysis => "city_delay_analysis",
            Self::ClientFailureAnalysis => "client_failure_analysis",
            Self::WarehouseFailureAnalysis => "warehouse_failure_analysis",
            Self::CityComparison => "city_comparison",
            Self::FestivalPeriodAnalysis => "festival_period_analysis",
            Self::CapacityImpactAnalysis => "capacity_impact_analysis",
            Self::Unknown => "unknown",
        }
    }

    /// Get a human-readable name for this query type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CityDelayAnalysis => "City Delay Analysis",
            Self::ClientFailureAnalysis => "Client Failure Analysis",
            Self::WarehouseFailureAnalysis => "Warehouse Failure Analysis",
            Self::CityComparison => "City Comparison",
            Self::FestivalPeriodAnalysis => "Festival Period Analysis",
            Self::CapacityImpactAnalysis => "Capacity Impact Analysis",
            Self::Unknown => "Unknown",
        }
    }

    /// Lowercase noun phrase used in parameter error messages.
    pub fn parameter_kind(&self) -> &'static str {
        match self {
            Self::CityDelayAnalysis => "city delay",
            Self::ClientFailureAnalysis => "client failure",
            Self::WarehouseFailureAnalysis => "warehouse failure",
            Self::CityComparison => "city comparison",
            Self::FestivalPeriodAnalysis => "festival period",
            Self::CapacityImpactAnalysis => "capacity impact",
            Self::Unknown => "unknown query",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Time Range
// ============================================================================

/// A concrete, inclusive span of local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Create a range. Swaps the endpoints if they arrive inverted.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A single calendar day, 00:00:00 through 23:59:59.999999.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date.and_time(NaiveTime::MIN),
            end: date.and_time(last_microsecond()),
        }
    }

    /// First day of `start_month` through the last day of `end_month` (23:59:59),
    /// both in `year`. Returns `None` for out-of-range months.
    pub fn months(year: i32, start_month: u32, end_month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, start_month, 1)?;
        let end = last_day_of_month(year, end_month)?;
        Some(Self::new(
            start.and_time(NaiveTime::MIN),
            end.and_time(last_second()),
        ))
    }

    /// A full calendar month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        Self::months(year, month, month)
    }

    /// January 1 00:00:00 through December 31 23:59:59.
    pub fn year(year: i32) -> Option<Self> {
        Self::months(year, 1, 12)
    }

    /// Length of the range.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `instant` falls inside the range (inclusive).
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Number of days in a month, leap years included.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    last_day_of_month(year, month).map(|d| d.day())
}

/// The last calendar day of a month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 0 || month > 12 {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

pub(crate) fn last_second() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn last_microsecond() -> NaiveTime {
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
}

// ============================================================================
// Data Bounds & Validation
// ============================================================================

/// Known extent of the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBounds {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

impl DataBounds {
    pub fn new(earliest: NaiveDateTime, latest: NaiveDateTime) -> Self {
        Self { earliest, latest }
    }

    /// Whether `range` shares at least one instant with the dataset.
    pub fn overlaps(&self, range: &TimeRange) -> bool {
        !(range.end < self.earliest || range.start > self.latest)
    }
}

impl Default for DataBounds {
    fn default() -> Self {
        let earliest = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
        let latest = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default();
        Self {
            earliest: earliest.and_time(NaiveTime::MIN),
            latest: latest.and_time(NaiveTime::MIN),
        }
    }
}

/// Outcome of checking a requested range against [`DataBounds`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValidation {
    /// False when the request does not overlap the data at all.
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub adjusted_start: NaiveDateTime,
    pub adjusted_end: NaiveDateTime,
    /// Bounds the request was checked against.
    pub bounds: DataBounds,
}

impl TimeValidation {
    /// The range analysis should run over.
    pub fn adjusted_range(&self) -> TimeRange {
        TimeRange::new(self.adjusted_start, self.adjusted_end)
    }
}

// ============================================================================
// Extracted Query
// ============================================================================

/// Time information attached to every time-bearing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeContext {
    /// Clamped range analysis should use.
    pub time_range: TimeRange,
    /// The literal phrase the scanner matched.
    pub time_expression: String,
    pub time_validation: TimeValidation,
}

/// A client or warehouse reference as written in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    Id(u64),
    Name(String),
}

impl EntityRef {
    /// Numeric literal becomes an id, anything else a title-cased name.
    ///
    /// Returns `None` for an all-digit literal that does not fit in a `u64`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw.parse::<u64>().ok().map(Self::Id);
        }
        Some(Self::Name(title_case(raw)))
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Name(name) => Some(name),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A fully typed analysis request, one variant per supported query type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "query_type", rename_all = "snake_case")]
pub enum AnalysisRequest {
    CityDelayAnalysis {
        city: String,
        /// Day under analysis (start of the clamped range).
        date: NaiveDateTime,
        #[serde(flatten)]
        time: TimeContext,
    },
    ClientFailureAnalysis {
        client: EntityRef,
        #[serde(flatten)]
        time: TimeContext,
    },
    WarehouseFailureAnalysis {
        warehouse: EntityRef,
        #[serde(flatten)]
        time: TimeContext,
    },
    CityComparison {
        city_a: String,
        city_b: String,
        #[serde(flatten)]
        time: TimeContext,
    },
    /// Runs over the configured festival period.
    FestivalPeriodAnalysis,
    CapacityImpactAnalysis {
        client_name: Option<String>,
        order_volume: u64,
    },
}

impl AnalysisRequest {
    pub fn query_type(&self) -> QueryType {
        match self {
            Self::CityDelayAnalysis { .. } => QueryType::CityDelayAnalysis,
            Self::ClientFailureAnalysis { .. } => QueryType::ClientFailureAnalysis,
            Self::WarehouseFailureAnalysis { .. } => QueryType::WarehouseFailureAnalysis,
            Self::CityComparison { .. } => QueryType::CityComparison,
            Self::FestivalPeriodAnalysis => QueryType::FestivalPeriodAnalysis,
            Self::CapacityImpactAnalysis { .. } => QueryType::CapacityImpactAnalysis,
        }
    }

    /// Time information, for the variants that carry it.
    pub fn time_context(&self) -> Option<&TimeContext> {
        match self {
            Self::CityDelayAnalysis { time, .. }
            | Self::ClientFailureAnalysis { time, .. }
            | Self::WarehouseFailureAnalysis { time, .. }
            | Self::CityComparison { time, .. } => Some(time),
            Self::FestivalPeriodAnalysis | Self::CapacityImpactAnalysis { .. } => None,
        }
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_context().map(|t| t.time_range)
    }
}

/// A query that could not be turned into an [`AnalysisRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    pub query_type: QueryType,
    #[serde(serialize_with = "serialize_display")]
    pub error: QueryError,
    /// Canonical example phrasings, only set for unrecognized intents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_queries: Vec<String>,
}

/// Either a typed request or a user-facing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Request(AnalysisRequest),
    Failure(QueryFailure),
}

/// The query processor's output for one input string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedQuery {
    pub original_query: String,
    #[serde(flatten)]
    pub outcome: QueryOutcome,
}

impl ExtractedQuery {
    pub fn request(original_query: impl Into<String>, request: AnalysisRequest) -> Self {
        Self {
            original_query: original_query.into(),
            outcome: QueryOutcome::Request(request),
        }
    }

    pub fn failure(original_query: impl Into<String>, failure: QueryFailure) -> Self {
        Self {
            original_query: original_query.into(),
            outcome: QueryOutcome::Failure(failure),
        }
    }

    pub fn query_type(&self) -> QueryType {
        match &self.outcome {
            QueryOutcome::Request(request) => request.query_type(),
            QueryOutcome::Failure(failure) => failure.query_type,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, QueryOutcome::Request(_))
    }

    pub fn as_request(&self) -> Option<&AnalysisRequest> {
        match &self.outcome {
            QueryOutcome::Request(request) => Some(request),
            QueryOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match &self.outcome {
            QueryOutcome::Request(_) => None,
            QueryOutcome::Failure(failure) => Some(&failure.error),
        }
    }

    pub fn supported_queries(&self) -> &[String] {
        match &self.outcome {
            QueryOutcome::Request(_) => &[],
            QueryOutcome::Failure(failure) => &failure.supported_queries,
        }
    }
}

/// One canonical phrasing per supported query type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedQuery {
    pub query_type: QueryType,
    pub example: &'static str,
    pub description: &'static str,
}

// ============================================================================
// Helpers
// ============================================================================

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

fn serialize_display<T: std::fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_query_type_names() {
        assert_eq!(QueryType::CityComparison.as_str(), "city_comparison");
        assert_eq!(
            QueryType::WarehouseFailureAnalysis.display_name(),
            "Warehouse Failure Analysis"
        );
        assert_eq!(QueryType::SUPPORTED.len(), 6);
        assert!(!QueryType::SUPPORTED.contains(&QueryType::Unknown));
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 13), None);
        assert_eq!(days_in_month(2025, 0), None);
    }

    #[test]
    fn test_month_range_ends_on_last_second() {
        let range = TimeRange::month(2024, 2).unwrap();
        assert_eq!(range.start, at(2024, 2, 1));
        assert_eq!(
            range.end,
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap()
        );
    }

    #[test]
    fn test_day_range_is_single_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let range = TimeRange::day(date);
        assert_eq!(range.start.date(), date);
        assert_eq!(range.end.date(), date);
        assert!(range.start < range.end);
    }

    #[test]
    fn test_time_range_new_orders_endpoints() {
        let range = TimeRange::new(at(2025, 3, 1), at(2025, 1, 1));
        assert!(range.start <= range.end);
        assert_eq!(range.start, at(2025, 1, 1));
    }

    #[test]
    fn test_bounds_overlap() {
        let bounds = DataBounds::default();
        assert!(bounds.overlaps(&TimeRange::month(2025, 6).unwrap()));
        assert!(bounds.overlaps(&TimeRange::new(at(2024, 6, 1), at(2025, 6, 30))));
        assert!(!bounds.overlaps(&TimeRange::month(2024, 6).unwrap()));
        assert!(!bounds.overlaps(&TimeRange::month(2026, 6).unwrap()));
    }

    #[test]
    fn test_entity_ref_parse() {
        assert_eq!(EntityRef::parse(" 42 "), Some(EntityRef::Id(42)));
        assert_eq!(
            EntityRef::parse("xyz corp"),
            Some(EntityRef::Name("Xyz Corp".to_string()))
        );
        assert_eq!(EntityRef::parse("b").unwrap().name(), Some("B"));
        assert_eq!(EntityRef::parse("99999999999999999999999"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new delhi"), "New Delhi");
        assert_eq!(title_case("XYZ"), "Xyz");
        assert_eq!(title_case("client abc's"), "Client Abc'S");
    }

    #[test]
    fn test_failure_serializes_error_message() {
        let query = ExtractedQuery::failure(
            "hello",
            QueryFailure {
                query_type: QueryType::Unknown,
                error: QueryError::UnrecognizedIntent,
                supported_queries: vec!["example".to_string()],
            },
        );
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["original_query"], "hello");
        assert_eq!(value["query_type"], "unknown");
        assert_eq!(
            value["error"],
            "Could not identify query type. Please rephrase your question."
        );
        assert_eq!(value["supported_queries"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_request_serializes_with_tag() {
        let query = ExtractedQuery::request(
            "capacity",
            AnalysisRequest::CapacityImpactAnalysis {
                client_name: Some("Xyz".to_string()),
                order_volume: 20_000,
            },
        );
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["query_type"], "capacity_impact_analysis");
        assert_eq!(value["order_volume"], 20_000);
        assert_eq!(value["client_name"], "Xyz");
    }
}
