//! FILENAME: analytics-engine/src/engine.rs
//! Report pipelines: filter -> aggregate -> derive -> sort -> footer.
//!
//! Each report is a fresh snapshot. Rebuilding after a filter change
//! produces new rows and a new drill-down index; nothing is patched in place.

use records::{Dimension, Fact, SaleRecord, SessionRecord};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    aggregate, by_month_and, Accumulator, Aggregation, DiscountAccumulator, GroupKey,
    SessionAccumulator,
};
use crate::definition::{DiscountSortKey, FilterSpec, RowSort, SessionSortKey};
use crate::drilldown::{DrillDownIndex, DrillDownResult};
use crate::filter::{filter, Filtered};
use crate::view::{
    derive_rows, footer, sort_rows, DiscountRow, DiscountTotals, MetricRow, SessionRow,
    SessionTotals, SummaryRow, Totals,
};

// ============================================================================
// SHARED PIPELINE
// ============================================================================

/// Groups a selection and derives one row per group, plus the footer and
/// the drill-down index for those groups.
fn summarize<R, A, T, F>(
    selection: &Filtered<'_, R>,
    key_fn: F,
    sort: RowSort<<SummaryRow<T> as MetricRow>::SortKey>,
) -> (Vec<SummaryRow<T>>, SummaryRow<T>, DrillDownIndex<GroupKey>)
where
    A: Accumulator<R>,
    T: Totals + for<'b> From<&'b A>,
    SummaryRow<T>: MetricRow,
    F: Fn(&R) -> GroupKey,
{
    let aggregation: Aggregation<GroupKey, A> = aggregate(selection.iter(), key_fn);
    let (buckets, index) = aggregation.into_parts();

    let mut rows: Vec<SummaryRow<T>> = derive_rows(&buckets);
    sort_rows(&mut rows, sort);
    let footer = footer(&rows);
    (rows, footer, index)
}

fn drill_into<T: Totals>(
    index: &DrillDownIndex<GroupKey>,
    row: &SummaryRow<T>,
    max_records: usize,
) -> Option<DrillDownResult<GroupKey>> {
    row.key.as_ref().map(|key| index.drill_down(key, max_records))
}

// ============================================================================
// DISCOUNT REPORT
// ============================================================================

/// Headline figures shown above the discount tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountHeadline {
    pub transactions: u64,
    pub total_discount: f64,
    pub discounted_sales: u64,
    pub avg_discount_percent: f64,
    pub total_revenue: f64,
}

impl DiscountHeadline {
    pub fn from_totals(totals: &DiscountTotals) -> Self {
        DiscountHeadline {
            transactions: totals.total_transactions,
            total_discount: totals.discount_value,
            discounted_sales: totals.discounted_transactions,
            avg_discount_percent: totals.metrics().avg_discount_percent,
            total_revenue: totals.total_revenue,
        }
    }
}

/// The sales a discount view works on: discounted sales only, or every
/// sale of the selection when none of them is discounted.
pub fn discount_focus<'a>(selection: &Filtered<'a, SaleRecord>) -> Filtered<'a, SaleRecord> {
    let discounted = selection.retain(SaleRecord::is_discounted);
    if discounted.is_empty() {
        log::debug!(
            "no discounted sales among {} records, using all of them",
            selection.len()
        );
        selection.clone()
    } else {
        discounted
    }
}

/// Month × dimension discount table.
#[derive(Debug, Clone)]
pub struct DiscountReport {
    pub dimension: Dimension,
    pub rows: Vec<DiscountRow>,
    pub footer: DiscountRow,
    /// Records that reached the aggregator.
    pub record_count: usize,
    drill_down: DrillDownIndex<GroupKey>,
}

impl DiscountReport {
    /// Every sale that passes `spec`, grouped by month × `dimension`.
    pub fn build(
        records: &[SaleRecord],
        spec: &FilterSpec,
        dimension: Dimension,
        sort: RowSort<DiscountSortKey>,
    ) -> Self {
        Self::from_selection(&filter(records, spec), dimension, sort)
    }

    /// The discount view. The discounted-or-all choice is made once over
    /// the whole dataset, then `spec` narrows it, so a window without
    /// discounted sales yields an empty table.
    pub fn focused(
        records: &[SaleRecord],
        spec: &FilterSpec,
        dimension: Dimension,
        sort: RowSort<DiscountSortKey>,
    ) -> Self {
        let selection = discount_focus(&Filtered::all(records)).refine(spec);
        Self::from_selection(&selection, dimension, sort)
    }

    pub fn from_selection(
        selection: &Filtered<'_, SaleRecord>,
        dimension: Dimension,
        sort: RowSort<DiscountSortKey>,
    ) -> Self {
        let (rows, footer, drill_down) = summarize::<_, DiscountAccumulator, DiscountTotals, _>(
            selection,
            by_month_and::<SaleRecord>(dimension),
            sort,
        );
        log::debug!(
            "discount report by {:?}: {} rows from {} records",
            dimension,
            rows.len(),
            selection.len()
        );
        DiscountReport {
            dimension,
            rows,
            footer,
            record_count: selection.len(),
            drill_down,
        }
    }

    pub fn headline(&self) -> DiscountHeadline {
        DiscountHeadline::from_totals(&self.footer.totals)
    }

    pub fn drill_down_index(&self) -> &DrillDownIndex<GroupKey> {
        &self.drill_down
    }

    /// Contributing records of `row`; `None` for the footer.
    pub fn drill_down(&self, row: &DiscountRow, max_records: usize) -> Option<DrillDownResult<GroupKey>> {
        drill_into(&self.drill_down, row, max_records)
    }
}

// ============================================================================
// SESSION REPORT
// ============================================================================

/// The two class families compared on the session dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassFamily {
    PowerCycle,
    Barre,
}

impl ClassFamily {
    pub const ALL: [ClassFamily; 2] = [ClassFamily::PowerCycle, ClassFamily::Barre];

    /// Lowercase substring that marks a class name as this family.
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassFamily::PowerCycle => "powercycle",
            ClassFamily::Barre => "barre",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClassFamily::PowerCycle => "PowerCycle",
            ClassFamily::Barre => "Barre",
        }
    }

    /// First family whose keyword the class name contains, ignoring case.
    pub fn classify(class_type: &str) -> Option<Self> {
        let lowered = class_type.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| lowered.contains(family.keyword()))
    }
}

/// Month × dimension attendance table.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Column header of the grouping dimension.
    pub dimension_label: String,
    pub rows: Vec<SessionRow>,
    pub footer: SessionRow,
    pub record_count: usize,
    drill_down: DrillDownIndex<GroupKey>,
}

impl SessionReport {
    /// Sessions passing `spec`, grouped by month × `dimension`
    /// (class type, trainer or location).
    pub fn build(
        records: &[SessionRecord],
        spec: &FilterSpec,
        dimension: Dimension,
        sort: RowSort<SessionSortKey>,
    ) -> Self {
        let selection = filter(records, spec);
        Self::summarize(
            &selection,
            dimension.display_name(),
            by_month_and::<SessionRecord>(dimension),
            sort,
        )
    }

    /// PowerCycle against Barre: sessions passing `spec` whose class name
    /// belongs to either family, grouped by month × family.
    pub fn class_families(
        records: &[SessionRecord],
        spec: &FilterSpec,
        sort: RowSort<SessionSortKey>,
    ) -> Self {
        let selection = filter(records, spec)
            .retain(|session| ClassFamily::classify(&session.class_type).is_some());
        Self::summarize(
            &selection,
            "Class Family",
            |session: &SessionRecord| {
                let family = ClassFamily::classify(&session.class_type)
                    .map_or(Dimension::ClassType.sentinel(), |family| family.label());
                GroupKey::new(session.period(), family)
            },
            sort,
        )
    }

    fn summarize<F>(
        selection: &Filtered<'_, SessionRecord>,
        dimension_label: &str,
        key_fn: F,
        sort: RowSort<SessionSortKey>,
    ) -> Self
    where
        F: Fn(&SessionRecord) -> GroupKey,
    {
        let (rows, footer, drill_down) =
            summarize::<_, SessionAccumulator, SessionTotals, _>(selection, key_fn, sort);
        log::debug!(
            "session report by {}: {} rows from {} records",
            dimension_label,
            rows.len(),
            selection.len()
        );
        SessionReport {
            dimension_label: dimension_label.to_string(),
            rows,
            footer,
            record_count: selection.len(),
            drill_down,
        }
    }

    pub fn drill_down_index(&self) -> &DrillDownIndex<GroupKey> {
        &self.drill_down
    }

    pub fn drill_down(&self, row: &SessionRow, max_records: usize) -> Option<DrillDownResult<GroupKey>> {
        drill_into(&self.drill_down, row, max_records)
    }
}
