//! FILENAME: analytics-engine/src/lib.rs
//! Analytics engine for the studio dashboard.
//!
//! Pipeline stages, in data-flow order:
//! - `filter`: FilterSpec -> ordered selection of record ids
//! - `aggregate`: selection -> buckets keyed by month × dimension
//! - `view`: buckets -> derived rows, footer, sorting
//! - `compare`: two row sets -> per-metric deltas
//! - `drilldown`: group key -> contributing records
//!
//! `engine` wires the stages into the discount and session reports.

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod definition;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod filter;
pub mod view;

pub use aggregate::{
    aggregate, by_month, by_month_and, Accumulator, Aggregation, DiscountAccumulator,
    DistinctSet, GroupKey, Merge, SessionAccumulator,
};
pub use compare::{
    compare, compare_totals, percent_change, Comparable, ComparisonRow, DiscountMetric, MetricDelta,
    SessionMetric, YearOverYear,
};
pub use config::{AnalyticsConfig, ComparisonYears, DEFAULT_DRILL_DOWN_LIMIT};
pub use definition::{
    DateRange, DefaultWindow, DiscountSortKey, FilterSpec, NumericBounds, RowSort,
    SessionSortKey, SortOrder,
};
pub use drilldown::{DrillDownIndex, DrillDownResult};
pub use engine::{discount_focus, ClassFamily, DiscountHeadline, DiscountReport, SessionReport};
pub use error::ConfigError;
pub use filter::{distinct_values, filter, Filtered, RecordId};
pub use view::{
    derive_rows, footer, sort_rows, DiscountMetrics, DiscountRow, DiscountTotals, MetricRow,
    SessionMetrics, SessionRow, SessionTotals, SortValue, SummaryRow, Totals,
};
