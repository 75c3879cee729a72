//! FILENAME: analytics-engine/src/compare.rs
//! Comparative Analyzer - aligns two sets of summary rows on a canonical
//! key list and reports per-metric deltas. Works for any row whose totals
//! implement `Comparable`.

use std::fmt::{Debug, Display};

use records::{MonthOfYear, SaleRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, by_month, Aggregation, DiscountAccumulator, GroupKey};
use crate::config::ComparisonYears;
use crate::definition::FilterSpec;
use crate::filter::filter;
use crate::view::{
    derive_rows, DiscountRow, DiscountTotals, SessionTotals, SummaryRow, Totals, FOOTER_LABEL,
};

/// `(current − baseline) / baseline × 100`. A zero baseline gives 0,
/// never an infinity.
pub fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (current - baseline) / baseline * 100.0
    }
}

/// One metric seen from both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub baseline: f64,
    pub current: f64,
    pub delta: f64,
    pub percent_change: f64,
}

impl MetricDelta {
    pub fn new(baseline: f64, current: f64) -> Self {
        MetricDelta {
            baseline,
            current,
            delta: current - baseline,
            percent_change: percent_change(baseline, current),
        }
    }
}

// ============================================================================
// COMPARED METRICS
// ============================================================================

/// Row totals that can be compared side by side. `COMPARED` lists the
/// metrics a comparison row reports, in display order.
pub trait Comparable: Totals {
    type Metric: Copy + Eq + Debug + Serialize + DeserializeOwned + 'static;

    const COMPARED: &'static [Self::Metric];

    fn value(&self, metric: Self::Metric) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMetric {
    DiscountValue,
    Revenue,
    Transactions,
    DiscountedTransactions,
    Members,
    Atv,
    DiscountRate,
}

impl Comparable for DiscountTotals {
    type Metric = DiscountMetric;

    const COMPARED: &'static [DiscountMetric] = &[
        DiscountMetric::DiscountValue,
        DiscountMetric::Revenue,
        DiscountMetric::Transactions,
        DiscountMetric::DiscountedTransactions,
        DiscountMetric::Members,
        DiscountMetric::Atv,
        DiscountMetric::DiscountRate,
    ];

    fn value(&self, metric: DiscountMetric) -> f64 {
        match metric {
            DiscountMetric::DiscountValue => self.discount_value,
            DiscountMetric::Revenue => self.total_revenue,
            DiscountMetric::Transactions => self.total_transactions as f64,
            DiscountMetric::DiscountedTransactions => self.discounted_transactions as f64,
            DiscountMetric::Members => self.members as f64,
            DiscountMetric::Atv => self.metrics().total_atv,
            DiscountMetric::DiscountRate => self.metrics().discount_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMetric {
    Sessions,
    CheckedIn,
    Capacity,
    Revenue,
    FillRate,
    ClassAverage,
    LateCancelRate,
}

impl Comparable for SessionTotals {
    type Metric = SessionMetric;

    const COMPARED: &'static [SessionMetric] = &[
        SessionMetric::Sessions,
        SessionMetric::CheckedIn,
        SessionMetric::Capacity,
        SessionMetric::Revenue,
        SessionMetric::FillRate,
        SessionMetric::ClassAverage,
        SessionMetric::LateCancelRate,
    ];

    fn value(&self, metric: SessionMetric) -> f64 {
        match metric {
            SessionMetric::Sessions => self.sessions as f64,
            SessionMetric::CheckedIn => self.checked_in as f64,
            SessionMetric::Capacity => self.capacity as f64,
            SessionMetric::Revenue => self.revenue,
            SessionMetric::FillRate => self.metrics().fill_rate,
            SessionMetric::ClassAverage => self.metrics().class_average,
            SessionMetric::LateCancelRate => self.metrics().late_cancel_rate,
        }
    }
}

// ============================================================================
// COMPARISON ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>"))]
pub struct ComparisonRow<K, T: Comparable> {
    /// Canonical key; `None` on the grand-total row.
    pub key: Option<K>,
    pub label: String,
    pub baseline: T,
    pub current: T,
    /// One delta per entry of `T::COMPARED`, in that order.
    pub deltas: Vec<(T::Metric, MetricDelta)>,
}

impl<K, T: Comparable> ComparisonRow<K, T> {
    pub fn from_totals(key: Option<K>, label: impl Into<String>, baseline: T, current: T) -> Self {
        let deltas = T::COMPARED
            .iter()
            .map(|&metric| (metric, MetricDelta::new(baseline.value(metric), current.value(metric))))
            .collect();

        ComparisonRow {
            key,
            label: label.into(),
            baseline,
            current,
            deltas,
        }
    }

    pub fn delta(&self, metric: T::Metric) -> MetricDelta {
        self.deltas
            .iter()
            .find(|(compared, _)| *compared == metric)
            .map(|(_, delta)| *delta)
            .unwrap_or_else(|| MetricDelta::new(self.baseline.value(metric), self.current.value(metric)))
    }
}

/// Sum of the totals of every row whose key is `key`. No match gives zeros.
fn side_totals<K, T, F>(rows: &[SummaryRow<T>], key: &K, key_fn: &F) -> T
where
    K: PartialEq,
    T: Totals,
    F: Fn(&SummaryRow<T>) -> Option<K>,
{
    let mut totals = T::default();
    for row in rows {
        if key_fn(row).as_ref() == Some(key) {
            totals.combine(&row.totals);
        }
    }
    totals
}

fn sum_totals<T: Totals>(rows: &[SummaryRow<T>]) -> T {
    let mut totals = T::default();
    for row in rows {
        totals.combine(&row.totals);
    }
    totals
}

/// One output row per canonical key, in canonical order.
///
/// `key_fn` maps a row to its comparison key; rows it maps to `None` or to
/// a key outside `canonical_keys` are ignored. Rows sharing a key on one
/// side are summed before comparing.
pub fn compare<K, T, F>(
    baseline: &[SummaryRow<T>],
    current: &[SummaryRow<T>],
    canonical_keys: &[K],
    key_fn: F,
) -> Vec<ComparisonRow<K, T>>
where
    K: PartialEq + Clone + Display,
    T: Comparable,
    F: Fn(&SummaryRow<T>) -> Option<K>,
{
    canonical_keys
        .iter()
        .map(|key| {
            ComparisonRow::from_totals(
                Some(key.clone()),
                key.to_string(),
                side_totals(baseline, key, &key_fn),
                side_totals(current, key, &key_fn),
            )
        })
        .collect()
}

/// Grand-total comparison over every row on each side.
pub fn compare_totals<K, T: Comparable>(
    baseline: &[SummaryRow<T>],
    current: &[SummaryRow<T>],
) -> ComparisonRow<K, T> {
    ComparisonRow::from_totals(None, FOOTER_LABEL, sum_totals(baseline), sum_totals(current))
}

// ============================================================================
// YEAR OVER YEAR
// ============================================================================

/// Month-by-month comparison of two calendar years over the fixed
/// January..December list. Months with no sales on a side compare as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYear {
    pub years: ComparisonYears,
    pub rows: Vec<ComparisonRow<MonthOfYear, DiscountTotals>>,
    pub total: ComparisonRow<MonthOfYear, DiscountTotals>,
}

impl YearOverYear {
    /// `spec` is applied first; its date range should cover both years.
    pub fn build(records: &[SaleRecord], spec: &FilterSpec, years: ComparisonYears) -> Self {
        let selection = filter(records, spec);
        let aggregation: Aggregation<GroupKey, DiscountAccumulator> =
            aggregate(selection.iter(), by_month::<SaleRecord>());
        let rows: Vec<DiscountRow> = derive_rows(aggregation.buckets());

        let (baseline, current) = split_years(rows, years);
        let month_key = |row: &DiscountRow| row.period().and_then(|p| p.month_of_year());

        let comparison = compare(&baseline, &current, &MonthOfYear::all(), month_key);
        let total = compare_totals(&baseline, &current);

        log::debug!(
            "year-over-year {} vs {}: {} baseline rows, {} current rows",
            years.baseline,
            years.current,
            baseline.len(),
            current.len()
        );

        YearOverYear {
            years,
            rows: comparison,
            total,
        }
    }
}

fn split_years(rows: Vec<DiscountRow>, years: ComparisonYears) -> (Vec<DiscountRow>, Vec<DiscountRow>) {
    let mut baseline = Vec::new();
    let mut current = Vec::new();
    for row in rows {
        match row.period().and_then(|p| p.year()) {
            Some(year) if year == years.baseline => baseline.push(row),
            Some(year) if year == years.current => current.push(row),
            _ => {}
        }
    }
    (baseline, current)
}
