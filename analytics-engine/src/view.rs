//! FILENAME: analytics-engine/src/view.rs
//! Analytics View - derived rows ready for a table renderer.
//!
//! A row carries two layers:
//! - raw totals (sums and counts straight from a bucket)
//! - metrics (ratios computed from those totals)
//!
//! Metrics are never summed. The footer sums raw totals across rows and
//! derives its metrics again from the sums.

use std::cmp::Ordering;
use std::fmt::Debug;

use records::Period;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DiscountAccumulator, GroupKey, SessionAccumulator};
use crate::definition::{DiscountSortKey, RowSort, SessionSortKey, SortOrder};

/// Period label of the footer row.
pub const FOOTER_LABEL: &str = "TOTAL";

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `part / whole × 100`, or 0 when `whole` is 0.
pub fn percent(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

// ============================================================================
// TOTALS TRAIT & ROW SHAPE
// ============================================================================

/// Raw, additive per-row sums and the metrics derived from them.
pub trait Totals: Copy + Default + Debug + PartialEq + Serialize + DeserializeOwned {
    type Metrics: Copy + Default + Debug + PartialEq + Serialize + DeserializeOwned;

    /// Adds another row's totals into these.
    fn combine(&mut self, other: &Self);

    fn metrics(&self) -> Self::Metrics;
}

/// One output row: identity, raw totals and derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SummaryRow<T: Totals> {
    /// Group key; `None` on the footer row.
    pub key: Option<GroupKey>,
    /// Sortable period key, e.g. "2025-03".
    pub period_key: String,
    /// Display period, e.g. "March 2025".
    pub period_label: String,
    pub dimension: String,
    #[serde(flatten)]
    pub totals: T,
    #[serde(flatten)]
    pub metrics: T::Metrics,
}

impl<T: Totals> SummaryRow<T> {
    pub fn new(key: GroupKey, totals: T) -> Self {
        SummaryRow {
            period_key: key.period.key(),
            period_label: key.period.label(),
            dimension: key.dimension.clone(),
            key: Some(key),
            metrics: totals.metrics(),
            totals,
        }
    }

    pub fn footer(totals: T) -> Self {
        SummaryRow {
            key: None,
            period_key: String::new(),
            period_label: FOOTER_LABEL.to_string(),
            dimension: String::new(),
            metrics: totals.metrics(),
            totals,
        }
    }

    pub fn is_footer(&self) -> bool {
        self.key.is_none()
    }

    pub fn period(&self) -> Option<Period> {
        self.key.as_ref().map(|key| key.period)
    }
}

/// Builds one row per bucket, preserving bucket order.
pub fn derive_rows<A, T>(buckets: &[(GroupKey, A)]) -> Vec<SummaryRow<T>>
where
    T: Totals + for<'b> From<&'b A>,
{
    buckets
        .iter()
        .map(|(key, bucket)| SummaryRow::new(key.clone(), T::from(bucket)))
        .collect()
}

/// Footer over `rows`: raw totals summed, metrics derived from the sums.
///
/// Distinct-entity counts are summed per row here, so a customer present in
/// two rows counts twice. `Aggregation::grand_total` gives the exact count.
pub fn footer<T: Totals>(rows: &[SummaryRow<T>]) -> SummaryRow<T> {
    let mut totals = T::default();
    for row in rows {
        totals.combine(&row.totals);
    }
    SummaryRow::footer(totals)
}

// ============================================================================
// DISCOUNT ROWS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountTotals {
    pub total_transactions: u64,
    pub discounted_transactions: u64,
    pub total_revenue: f64,
    pub discounted_revenue: f64,
    pub discount_value: f64,
    pub discount_percent_sum: f64,
    pub members: u64,
    pub discounted_members: u64,
}

impl From<&DiscountAccumulator> for DiscountTotals {
    fn from(acc: &DiscountAccumulator) -> Self {
        DiscountTotals {
            total_transactions: acc.total_transactions,
            discounted_transactions: acc.discounted_transactions,
            total_revenue: acc.total_revenue,
            discounted_revenue: acc.discounted_revenue,
            discount_value: acc.discount_value,
            discount_percent_sum: acc.discount_percent_sum,
            members: acc.members.len() as u64,
            discounted_members: acc.discounted_members.len() as u64,
        }
    }
}

/// Ratios for a discount row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountMetrics {
    /// Mean discount percentage over discounted sales.
    pub avg_discount_percent: f64,
    pub discounted_atv: f64,
    pub total_atv: f64,
    pub discounted_auv: f64,
    pub total_auv: f64,
    /// Share of transactions that were discounted (penetration), in percent.
    pub discount_rate: f64,
    /// Revenue from full-price sales.
    pub revenue_impact: f64,
    pub avg_discount_per_transaction: f64,
}

impl DiscountMetrics {
    pub fn from_totals(t: &DiscountTotals) -> Self {
        let total = t.total_transactions as f64;
        let discounted = t.discounted_transactions as f64;

        DiscountMetrics {
            avg_discount_percent: ratio(t.discount_percent_sum, discounted),
            discounted_atv: ratio(t.discounted_revenue, discounted),
            total_atv: ratio(t.total_revenue, total),
            discounted_auv: ratio(t.discounted_revenue, t.discounted_members as f64),
            total_auv: ratio(t.total_revenue, t.members as f64),
            discount_rate: percent(discounted, total),
            revenue_impact: t.total_revenue - t.discounted_revenue,
            avg_discount_per_transaction: ratio(t.discount_value, discounted),
        }
    }
}

impl Totals for DiscountTotals {
    type Metrics = DiscountMetrics;

    fn combine(&mut self, other: &Self) {
        self.total_transactions += other.total_transactions;
        self.discounted_transactions += other.discounted_transactions;
        self.total_revenue += other.total_revenue;
        self.discounted_revenue += other.discounted_revenue;
        self.discount_value += other.discount_value;
        self.discount_percent_sum += other.discount_percent_sum;
        self.members += other.members;
        self.discounted_members += other.discounted_members;
    }

    fn metrics(&self) -> DiscountMetrics {
        DiscountMetrics::from_totals(self)
    }
}

pub type DiscountRow = SummaryRow<DiscountTotals>;

// ============================================================================
// SESSION ROWS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub sessions: u64,
    pub empty_sessions: u64,
    pub capacity: u64,
    pub checked_in: u64,
    pub booked: u64,
    pub late_cancelled: u64,
    pub revenue: f64,
    pub trainers: u64,
    pub classes: u64,
}

impl From<&SessionAccumulator> for SessionTotals {
    fn from(acc: &SessionAccumulator) -> Self {
        SessionTotals {
            sessions: acc.sessions,
            empty_sessions: acc.empty_sessions,
            capacity: acc.capacity,
            checked_in: acc.checked_in,
            booked: acc.booked,
            late_cancelled: acc.late_cancelled,
            revenue: acc.revenue,
            trainers: acc.trainers.len() as u64,
            classes: acc.classes.len() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub fill_rate: f64,
    pub booking_rate: f64,
    pub class_average: f64,
    pub class_average_excluding_empty: f64,
    pub late_cancel_rate: f64,
    pub revenue_per_attendee: f64,
    pub revenue_per_session: f64,
}

impl SessionMetrics {
    pub fn from_totals(t: &SessionTotals) -> Self {
        let checked_in = t.checked_in as f64;
        let sessions = t.sessions as f64;
        let attended_sessions = t.sessions.saturating_sub(t.empty_sessions) as f64;

        SessionMetrics {
            fill_rate: percent(checked_in, t.capacity as f64),
            booking_rate: percent(t.booked as f64, t.capacity as f64),
            class_average: ratio(checked_in, sessions),
            class_average_excluding_empty: ratio(checked_in, attended_sessions),
            late_cancel_rate: percent(t.late_cancelled as f64, t.booked as f64),
            revenue_per_attendee: ratio(t.revenue, checked_in),
            revenue_per_session: ratio(t.revenue, sessions),
        }
    }
}

impl Totals for SessionTotals {
    type Metrics = SessionMetrics;

    fn combine(&mut self, other: &Self) {
        self.sessions += other.sessions;
        self.empty_sessions += other.empty_sessions;
        self.capacity += other.capacity;
        self.checked_in += other.checked_in;
        self.booked += other.booked;
        self.late_cancelled += other.late_cancelled;
        self.revenue += other.revenue;
        self.trainers += other.trainers;
        self.classes += other.classes;
    }

    fn metrics(&self) -> SessionMetrics {
        SessionMetrics::from_totals(self)
    }
}

pub type SessionRow = SummaryRow<SessionTotals>;

// ============================================================================
// SORTING
// ============================================================================

/// A comparable field value pulled out of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
    Period(Option<Period>),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Period(a), SortValue::Period(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A row type that can be ordered by a selectable field.
pub trait MetricRow {
    type SortKey: Copy;

    fn sort_value(&self, key: Self::SortKey) -> SortValue<'_>;
}

impl MetricRow for DiscountRow {
    type SortKey = DiscountSortKey;

    fn sort_value(&self, key: DiscountSortKey) -> SortValue<'_> {
        let t = &self.totals;
        match key {
            DiscountSortKey::DiscountValue => SortValue::Number(t.discount_value),
            DiscountSortKey::TotalRevenue => SortValue::Number(t.total_revenue),
            DiscountSortKey::DiscountedRevenue => SortValue::Number(t.discounted_revenue),
            DiscountSortKey::TotalTransactions => SortValue::Number(t.total_transactions as f64),
            DiscountSortKey::DiscountedTransactions => {
                SortValue::Number(t.discounted_transactions as f64)
            }
            DiscountSortKey::DiscountRate => SortValue::Number(self.metrics.discount_rate),
            DiscountSortKey::AvgDiscountPercent => {
                SortValue::Number(self.metrics.avg_discount_percent)
            }
            DiscountSortKey::TotalAtv => SortValue::Number(self.metrics.total_atv),
            DiscountSortKey::Members => SortValue::Number(t.members as f64),
            DiscountSortKey::Period => SortValue::Period(self.period()),
            DiscountSortKey::Dimension => SortValue::Text(&self.dimension),
        }
    }
}

impl MetricRow for SessionRow {
    type SortKey = SessionSortKey;

    fn sort_value(&self, key: SessionSortKey) -> SortValue<'_> {
        match key {
            SessionSortKey::Sessions => SortValue::Number(self.totals.sessions as f64),
            SessionSortKey::CheckedIn => SortValue::Number(self.totals.checked_in as f64),
            SessionSortKey::FillRate => SortValue::Number(self.metrics.fill_rate),
            SessionSortKey::ClassAverage => SortValue::Number(self.metrics.class_average),
            SessionSortKey::Revenue => SortValue::Number(self.totals.revenue),
            SessionSortKey::Period => SortValue::Period(self.period()),
            SessionSortKey::Dimension => SortValue::Text(&self.dimension),
        }
    }
}

/// Stable sort: rows with equal values keep their bucket order.
pub fn sort_rows<T: MetricRow>(rows: &mut [T], sort: RowSort<T::SortKey>) {
    rows.sort_by(|a, b| {
        let ordering = a.sort_value(sort.key).compare(&b.sort_value(sort.key));
        match sort.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}
