//! FILENAME: analytics-engine/src/definition.rs
//! Analytics Definition - the serializable filter and sort configuration.
//!
//! These structures describe WHAT a view should show:
//! - Serializable (sent from the dashboard controller as JSON)
//! - Immutable snapshots of user intent; the engine never mutates them
//! - Every constraint is optional, and absence means "no restriction"

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use records::{Dimension, Measure};
use serde::{Deserialize, Serialize};

// ============================================================================
// DATE RANGE
// ============================================================================

/// Inclusive calendar-date interval. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        DateRange::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Tests a record timestamp against the interval.
    /// Once any bound is set, a record without a timestamp never matches.
    pub fn contains(&self, timestamp: Option<NaiveDateTime>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = timestamp else {
            return false;
        };
        let date = ts.date();
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// First to last day of the month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let first = first_of_month(date);
        let last = first_of_month(next_month(first))
            .pred_opt()
            .unwrap_or(first);
        DateRange::between(first, last)
    }

    /// The full calendar month before the one containing `today`.
    pub fn previous_month(today: NaiveDate) -> Self {
        let first = first_of_month(today);
        match first.pred_opt() {
            Some(last_of_previous) => DateRange::month_of(last_of_previous),
            None => DateRange::month_of(first),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Some day in the month after `date`'s month.
fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// How the initial date window of a view is seeded.
/// Resolved against a caller-supplied "today" so no clock is read here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefaultWindow {
    PreviousMonth,
    CurrentMonth,
    Unbounded,
    Fixed {
        #[serde(default)]
        start: Option<NaiveDate>,
        #[serde(default)]
        end: Option<NaiveDate>,
    },
}

impl Default for DefaultWindow {
    fn default() -> Self {
        DefaultWindow::PreviousMonth
    }
}

impl DefaultWindow {
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match *self {
            DefaultWindow::PreviousMonth => DateRange::previous_month(today),
            DefaultWindow::CurrentMonth => DateRange::month_of(today),
            DefaultWindow::Unbounded => DateRange::unbounded(),
            DefaultWindow::Fixed { start, end } => DateRange::new(start, end),
        }
    }
}

// ============================================================================
// NUMERIC BOUNDS
// ============================================================================

/// Inclusive numeric bounds; an unset side imposes no restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumericBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        NumericBounds { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

// ============================================================================
// FILTER SPEC
// ============================================================================

/// The full set of constraints applied before grouping.
///
/// All constraints combine with AND. An empty allowed-value set and an empty
/// keyword list both mean "no restriction". Contradictory constraints (an
/// inverted date range, min above max) are not errors; they simply match
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Inclusive date interval on the record's occurrence date.
    pub date_range: DateRange,

    /// Allowed values per categorical field (exact match).
    pub allowed: BTreeMap<Dimension, BTreeSet<String>>,

    /// Inclusive bounds per numeric field.
    pub bounds: BTreeMap<Measure, NumericBounds>,

    /// Case-insensitive substring keywords per categorical field.
    /// A record passes when its value contains any one of them.
    pub keywords: BTreeMap<Dimension, Vec<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        FilterSpec::default()
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Adds values to a dimension's allow-list.
    pub fn allow<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .entry(dimension)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn bound(mut self, measure: Measure, min: Option<f64>, max: Option<f64>) -> Self {
        self.bounds.insert(measure, NumericBounds::new(min, max));
        self
    }

    pub fn keyword(mut self, dimension: Dimension, keyword: &str) -> Self {
        self.keywords
            .entry(dimension)
            .or_default()
            .push(keyword.to_string());
        self
    }

    /// True when no constraint would exclude anything.
    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_unbounded()
            && self.allowed.values().all(BTreeSet::is_empty)
            && self.bounds.values().all(NumericBounds::is_unbounded)
            && self.keywords.values().all(Vec::is_empty)
    }
}

// ============================================================================
// SORTING
// ============================================================================

/// Sort direction for derived rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Ascending
    }
}

/// Fields a discount row can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSortKey {
    DiscountValue,
    TotalRevenue,
    DiscountedRevenue,
    TotalTransactions,
    DiscountedTransactions,
    DiscountRate,
    AvgDiscountPercent,
    TotalAtv,
    Members,
    Period,
    Dimension,
}

/// Fields a session row can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSortKey {
    Sessions,
    CheckedIn,
    FillRate,
    ClassAverage,
    Revenue,
    Period,
    Dimension,
}

/// A sort selector: which field, which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSort<K> {
    pub key: K,
    #[serde(default)]
    pub order: SortOrder,
}

impl<K> RowSort<K> {
    pub fn new(key: K, order: SortOrder) -> Self {
        RowSort { key, order }
    }

    pub fn ascending(key: K) -> Self {
        RowSort::new(key, SortOrder::Ascending)
    }

    pub fn descending(key: K) -> Self {
        RowSort::new(key, SortOrder::Descending)
    }
}

impl Default for RowSort<DiscountSortKey> {
    /// Largest total discount first.
    fn default() -> Self {
        RowSort::descending(DiscountSortKey::DiscountValue)
    }
}

impl Default for RowSort<SessionSortKey> {
    fn default() -> Self {
        RowSort::descending(SessionSortKey::CheckedIn)
    }
}
