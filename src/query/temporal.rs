//! Time expression parsing for historical analysis windows.
//!
//! Turns phrases such as "3 months ago", "January to March 2024", "Q3 2024",
//! "August" or "2025-06-15" into a concrete [`TimeRange`], and checks requested
//! ranges against the extent of the loaded dataset.
//!
//! Rules are tried in a fixed order and the first one that matches wins:
//! relative expressions, explicit month ranges, month/year, quarters, bare
//! years, then specific dates. Anything else resolves to the previous calendar
//! month.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use super::types::{DataBounds, TimeRange, TimeValidation};

// ============================================================================
// Month & Quarter Tables
// ============================================================================

const MONTHS: [(&str, u32); 24] = [
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Look up a (lowercase) month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// First and last month of a quarter.
pub fn quarter_months(quarter: u32) -> Option<(u32, u32)> {
    match quarter {
        1 => Some((1, 3)),
        2 => Some((4, 6)),
        3 => Some((7, 9)),
        4 => Some((10, 12)),
        _ => None,
    }
}

/// Quarter number from "q3", "quarter 3" or "third quarter".
fn quarter_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("quarter") {
        return rest.trim().parse().ok().filter(|q| (1..=4).contains(q));
    }
    if let Some(ordinal) = text.strip_suffix("quarter") {
        return match ordinal.trim() {
            "first" => Some(1),
            "second" => Some(2),
            "third" => Some(3),
            "fourth" => Some(4),
            _ => None,
        };
    }
    text.strip_prefix('q')
        .and_then(|digit| digit.parse().ok())
        .filter(|q| (1..=4).contains(q))
}

// ============================================================================
// Time Expression Parser
// ============================================================================

/// Parses free-text time phrases relative to a reference instant.
#[derive(Debug, Clone)]
pub struct TimeExpressionParser {
    bounds: DataBounds,
    /// Fixed "now" for relative phrases; the local clock when unset.
    reference: Option<NaiveDateTime>,
}

impl Default for TimeExpressionParser {
    fn default() -> Self {
        Self::new(DataBounds::default())
    }
}

impl TimeExpressionParser {
    /// Create a parser that validates against `bounds` and reads the local clock.
    pub fn new(bounds: DataBounds) -> Self {
        Self {
            bounds,
            reference: None,
        }
    }

    /// Pin the reference instant used for relative expressions.
    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn bounds(&self) -> &DataBounds {
        &self.bounds
    }

    /// The instant relative expressions are measured from.
    pub fn now(&self) -> NaiveDateTime {
        self.reference
            .unwrap_or_else(|| Local::now().naive_local())
    }

    /// Parse a time phrase. Never fails: unrecognized input yields last month.
    pub fn parse(&self, text: &str) -> TimeRange {
        let text = text.trim().to_lowercase();
        let now = self.now();

        let parsed = self
            .parse_relative(&text, now)
            .or_else(|| self.parse_date_range(&text, now))
            .or_else(|| self.parse_month_year(&text, now))
            .or_else(|| self.parse_quarter(&text, now))
            .or_else(|| self.parse_year(&text))
            .or_else(|| self.parse_specific_date(&text));

        match parsed {
            Some(range) => range,
            None => {
                warn!(
                    expression = %text,
                    "Could not parse time expression, defaulting to last month"
                );
                Self::last_month_from(now)
            }
        }
    }

    /// The previous calendar month relative to the reference instant.
    pub fn last_month(&self) -> TimeRange {
        Self::last_month_from(self.now())
    }

    /// Check a range against this parser's data bounds.
    pub fn validate(&self, range: &TimeRange) -> TimeValidation {
        validate_range(range, &self.bounds)
    }

    // ========================================================================
    // Relative Expressions
    // ========================================================================

    fn parse_relative(&self, text: &str, now: NaiveDateTime) -> Option<TimeRange> {
        for pattern in RELATIVE_PATTERNS.iter() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let Ok(count) = caps[1].parse::<i64>() else {
                continue;
            };
            let unit = caps[2].trim_end_matches('s');

            let start = match unit {
                "day" => Duration::try_days(count).and_then(|d| now.checked_sub_signed(d)),
                "week" => Duration::try_weeks(count).and_then(|d| now.checked_sub_signed(d)),
                // Months are approximated as 30 days.
                "month" => count
                    .checked_mul(30)
                    .and_then(Duration::try_days)
                    .and_then(|d| now.checked_sub_signed(d)),
                "year" => Self::years_before(now, count),
                _ => None,
            };

            if let Some(start) = start {
                return Some(TimeRange::new(start, now));
            }
        }

        if text.contains("yesterday") {
            let yesterday = now.date().pred_opt()?;
            return Some(TimeRange::day(yesterday));
        }

        if text.contains("last week") || text.contains("past week") {
            let start = now.checked_sub_signed(Duration::days(7))?;
            return Some(TimeRange::new(start, now));
        }

        if text.contains("last month") || text.contains("past month") {
            return Some(Self::last_month_from(now));
        }

        if text.contains("last year") || text.contains("past year") {
            return TimeRange::year(now.year() - 1);
        }

        None
    }

    /// Same calendar day `count` years back, or `365 * count` days on Feb 29.
    fn years_before(now: NaiveDateTime, count: i64) -> Option<NaiveDateTime> {
        let year = i32::try_from(count)
            .ok()
            .and_then(|count| now.year().checked_sub(count))?;
        now.with_year(year).or_else(|| {
            count
                .checked_mul(365)
                .and_then(Duration::try_days)
                .and_then(|d| now.checked_sub_signed(d))
        })
    }

    // ========================================================================
    // Explicit Month Ranges
    // ========================================================================

    fn parse_date_range(&self, text: &str, now: NaiveDateTime) -> Option<TimeRange> {
        for pattern in RANGE_WITH_YEAR_PATTERNS.iter() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let (Some(start_month), Some(end_month)) =
                (month_number(&caps[1]), month_number(&caps[2]))
            else {
                continue;
            };
            let Ok(year) = caps[3].parse::<i32>() else {
                continue;
            };
            return Self::month_span(year, start_month, end_month);
        }

        for pattern in RANGE_NO_YEAR_PATTERNS.iter() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let (Some(start_month), Some(end_month)) =
                (month_number(&caps[1]), month_number(&caps[2]))
            else {
                continue;
            };
            let year = if end_month <= now.month() {
                now.year()
            } else {
                now.year() - 1
            };
            return Self::month_span(year, start_month, end_month);
        }

        None
    }

    /// Month span ending in `year`; a range that wraps past December starts
    /// in the year before.
    fn month_span(year: i32, start_month: u32, end_month: u32) -> Option<TimeRange> {
        if start_month <= end_month {
            return TimeRange::months(year, start_month, end_month);
        }
        let start = TimeRange::month(year - 1, start_month)?;
        let end = TimeRange::month(year, end_month)?;
        Some(TimeRange::new(start.start, end.end))
    }

    // ========================================================================
    // Month / Year
    // ========================================================================

    fn parse_month_year(&self, text: &str, now: NaiveDateTime) -> Option<TimeRange> {
        if let Some(caps) = MONTH_YEAR_PATTERN.captures(text) {
            if let (Some(month), Ok(year)) = (month_number(&caps[1]), caps[2].parse::<i32>()) {
                return TimeRange::month(year, month);
            }
        }

        let caps = MONTH_ONLY_PATTERN.captures(text)?;
        let month = month_number(&caps[1])?;
        let year = if month <= now.month() {
            now.year()
        } else {
            now.year() - 1
        };
        TimeRange::month(year, month)
    }

    // ========================================================================
    // Quarters
    // ========================================================================

    fn parse_quarter(&self, text: &str, now: NaiveDateTime) -> Option<TimeRange> {
        for pattern in QUARTER_WITH_YEAR_PATTERNS.iter() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let Some((start_month, end_month)) =
                quarter_number(&caps[1]).and_then(quarter_months)
            else {
                continue;
            };
            let Ok(year) = caps[2].parse::<i32>() else {
                continue;
            };
            return TimeRange::months(year, start_month, end_month);
        }

        for pattern in QUARTER_ONLY_PATTERNS.iter() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let Some(quarter) = quarter_number(&caps[1]) else {
                continue;
            };
            let (start_month, end_month) = quarter_months(quarter)?;
            let current_quarter = (now.month() - 1) / 3 + 1;
            let year = if quarter <= current_quarter {
                now.year()
            } else {
                now.year() - 1
            };
            return TimeRange::months(year, start_month, end_month);
        }

        None
    }

    // ========================================================================
    // Years & Specific Dates
    // ========================================================================

    fn parse_year(&self, text: &str) -> Option<TimeRange> {
        let caps = YEAR_ONLY_PATTERN.captures(text)?;
        TimeRange::year(caps[1].parse().ok()?)
    }

    fn parse_specific_date(&self, text: &str) -> Option<TimeRange> {
        // Year-first formats
        for pattern in [&*ISO_DATE_PATTERN, &*ISO_SLASH_DATE_PATTERN] {
            if let Some(caps) = pattern.captures(text) {
                if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
                    return Some(TimeRange::day(date));
                }
            }
        }

        // Month-first, then day-first when the leading number cannot be a month
        for pattern in [&*US_SLASH_DATE_PATTERN, &*US_DASH_DATE_PATTERN] {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            if let Some(date) = ymd(&caps[3], &caps[1], &caps[2]) {
                return Some(TimeRange::day(date));
            }
            let leading: u32 = caps[1].parse().unwrap_or(0);
            if leading > 12 {
                if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
                    return Some(TimeRange::day(date));
                }
            }
        }

        None
    }

    fn last_month_from(now: NaiveDateTime) -> TimeRange {
        let (year, month) = if now.month() == 1 {
            (now.year() - 1, 12)
        } else {
            (now.year(), now.month() - 1)
        };
        TimeRange::month(year, month).unwrap_or_else(|| TimeRange::day(now.date()))
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

// ============================================================================
// Validation
// ============================================================================

/// Check a requested range against the dataset's bounds.
///
/// A range with no overlap is reported invalid and left untouched; otherwise
/// each end that falls outside the data is clamped to the nearest bound.
pub fn validate_range(range: &TimeRange, bounds: &DataBounds) -> TimeValidation {
    let mut validation = TimeValidation {
        valid: true,
        warnings: Vec::new(),
        suggestions: Vec::new(),
        adjusted_start: range.start,
        adjusted_end: range.end,
        bounds: *bounds,
    };

    if !bounds.overlaps(range) {
        validation.valid = false;
        validation.warnings.push(format!(
            "Requested date range ({} to {}) is outside available data range ({} to {})",
            fmt_date(range.start),
            fmt_date(range.end),
            fmt_date(bounds.earliest),
            fmt_date(bounds.latest)
        ));
        validation.suggestions.push(format!(
            "Try a date range between {} and {}",
            fmt_date(bounds.earliest),
            fmt_date(bounds.latest)
        ));
        warn!(range = %range, "Requested range does not overlap available data");
        return validation;
    }

    if range.start < bounds.earliest {
        validation.warnings.push(format!(
            "Requested start date ({}) is before available data starts ({})",
            fmt_date(range.start),
            fmt_date(bounds.earliest)
        ));
        validation.suggestions.push(format!(
            "Analysis will start from {} instead",
            fmt_date(bounds.earliest)
        ));
        validation.adjusted_start = bounds.earliest;
    }

    if range.end > bounds.latest {
        validation.warnings.push(format!(
            "Requested end date ({}) is after available data ends ({})",
            fmt_date(range.end),
            fmt_date(bounds.latest)
        ));
        validation.suggestions.push(format!(
            "Analysis will end at {} instead",
            fmt_date(bounds.latest)
        ));
        validation.adjusted_end = bounds.latest;
    }

    if !validation.warnings.is_empty() {
        warn!(
            range = %range,
            adjusted = %validation.adjusted_range(),
            "Clamped requested range to available data"
        );
    }

    validation
}

fn fmt_date(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%d").to_string()
}

// ============================================================================
// Regex Patterns
// ============================================================================

static RELATIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)\s+(months?|weeks?|days?|years?)\s+ago",
        r"(\d+)\s+(months?|weeks?|days?|years?)\s+back",
        r"past\s+(\d+)\s+(months?|weeks?|days?|years?)",
        r"last\s+(\d+)\s+(months?|weeks?|days?|years?)",
        r"previous\s+(\d+)\s+(months?|weeks?|days?|years?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static RANGE_WITH_YEAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\w+)\s+to\s+(\w+)\s+(\d{4})",
        r"(\w+)\s+-\s+(\w+)\s+(\d{4})",
        r"between\s+(\w+)\s+and\s+(\w+)\s+(\d{4})",
        r"from\s+(\w+)\s+to\s+(\w+)\s+(\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static RANGE_NO_YEAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\w+)\s+to\s+(\w+)",
        r"(\w+)\s+-\s+(\w+)",
        r"between\s+(\w+)\s+and\s+(\w+)",
        r"from\s+(\w+)\s+to\s+(\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static MONTH_YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s+(\d{4})").expect("Invalid regex"));
static MONTH_ONLY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)$").expect("Invalid regex"));

static QUARTER_WITH_YEAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(q[1-4])\s+(\d{4})",
        r"(quarter\s+[1-4])\s+(\d{4})",
        r"(\w+\s+quarter)\s+(\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static QUARTER_ONLY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^(q[1-4])$", r"^(quarter\s+[1-4])$", r"^(\w+\s+quarter)$"]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex"))
        .collect()
});

static YEAR_ONLY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})$").expect("Invalid regex"));

static ISO_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("Invalid regex"));
static ISO_SLASH_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})/(\d{1,2})/(\d{1,2})").expect("Invalid regex"));
static US_SLASH_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("Invalid regex"));
static US_DASH_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})-(\d{1,2})-(\d{4})").expect("Invalid regex"));

// ============================================================================
// Tests
// ============================================================================
