//! FILENAME: analytics-engine/src/aggregate.rs
//! Grouping Aggregator - one linear pass from records to per-group buckets.
//!
//! Every view shares the same pipeline and differs only in two choices:
//! - a key function (record -> group key)
//! - an accumulator type (what a bucket remembers about its records)
//!
//! Buckets are created on first encounter of a key and enumerated in that
//! order. Record ids are collected alongside so drill-down needs no rescan.

use std::hash::Hash;

use records::{Dimension, Fact, Period, SaleRecord, SessionRecord};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::drilldown::{DrillDownIndex, RecordIds};
use crate::filter::RecordId;

/// Dimension label used when grouping by period alone.
pub const ALL_LABEL: &str = "All";

// ============================================================================
// ACCUMULATOR TRAITS
// ============================================================================

/// Combining two partial buckets. Must be associative, and combining with
/// `Default::default()` must change nothing.
pub trait Merge {
    fn merge(&mut self, other: &Self);
}

/// A bucket that folds records of type `R`.
pub trait Accumulator<R>: Default + Merge {
    fn add(&mut self, record: &R);
}

// ============================================================================
// GROUP KEY
// ============================================================================

/// Composite grouping key: calendar month × one dimension value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub period: Period,
    pub dimension: String,
}

impl GroupKey {
    pub fn new(period: Period, dimension: impl Into<String>) -> Self {
        GroupKey {
            period,
            dimension: dimension.into(),
        }
    }
}

/// Key function for month × `dimension`. Absent values group under the
/// dimension's sentinel label.
pub fn by_month_and<R: Fact>(dimension: Dimension) -> impl Fn(&R) -> GroupKey {
    move |record: &R| GroupKey::new(record.period(), record.dimension_or_sentinel(dimension))
}

/// Key function for month alone.
pub fn by_month<R: Fact>() -> impl Fn(&R) -> GroupKey {
    |record: &R| GroupKey::new(record.period(), ALL_LABEL)
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Buckets keyed by `K`, in first-encounter order, with their record ids.
#[derive(Debug, Clone)]
pub struct Aggregation<K, A> {
    buckets: Vec<(K, A)>,
    record_ids: Vec<RecordIds>,
    positions: FxHashMap<K, usize>,
    record_count: usize,
}

impl<K, A> Default for Aggregation<K, A> {
    fn default() -> Self {
        Aggregation {
            buckets: Vec::new(),
            record_ids: Vec::new(),
            positions: FxHashMap::default(),
            record_count: 0,
        }
    }
}

impl<K: Eq + Hash + Clone, A> Aggregation<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record into the bucket for `key`, creating it if needed.
    pub fn push<R>(&mut self, id: RecordId, key: K, record: &R)
    where
        A: Accumulator<R>,
    {
        let position = self.position_of(key);
        self.buckets[position].1.add(record);
        self.record_ids[position].push(id);
        self.record_count += 1;
    }

    fn position_of(&mut self, key: K) -> usize
    where
        A: Default,
    {
        if let Some(&position) = self.positions.get(&key) {
            return position;
        }
        let position = self.buckets.len();
        self.positions.insert(key.clone(), position);
        self.buckets.push((key, A::default()));
        self.record_ids.push(SmallVec::new());
        position
    }

    /// Combines a partial aggregation into this one. Buckets new to `self`
    /// are appended in `other`'s order.
    pub fn absorb(&mut self, other: Aggregation<K, A>)
    where
        A: Default + Merge,
    {
        for ((key, bucket), ids) in other.buckets.into_iter().zip(other.record_ids) {
            let position = self.position_of(key);
            self.buckets[position].1.merge(&bucket);
            self.record_ids[position].extend(ids);
        }
        self.record_count += other.record_count;
    }

    /// All buckets merged into one. Distinct counts stay exact because
    /// the underlying sets are merged, not their sizes.
    pub fn grand_total(&self) -> A
    where
        A: Default + Merge,
    {
        let mut total = A::default();
        for (_, bucket) in &self.buckets {
            total.merge(bucket);
        }
        total
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of records folded in.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn buckets(&self) -> &[(K, A)] {
        &self.buckets
    }

    pub fn get(&self, key: &K) -> Option<&A> {
        self.positions.get(key).map(|&position| &self.buckets[position].1)
    }

    pub fn record_ids(&self, key: &K) -> &[RecordId] {
        self.positions
            .get(key)
            .map(|&position| self.record_ids[position].as_slice())
            .unwrap_or(&[])
    }

    /// Splits into the ordered buckets and the drill-down index.
    pub fn into_parts(self) -> (Vec<(K, A)>, DrillDownIndex<K>) {
        let keys: Vec<K> = self.buckets.iter().map(|(key, _)| key.clone()).collect();
        let index = DrillDownIndex::from_groups(keys.into_iter().zip(self.record_ids));
        (self.buckets, index)
    }
}

/// Groups `records` by `key_fn` and folds each group into an `A`.
///
/// One pass, constant amortized work per record. The ids paired with each
/// record are what the drill-down index later hands back.
pub fn aggregate<'a, R, K, A, I, F>(records: I, key_fn: F) -> Aggregation<K, A>
where
    R: 'a,
    I: IntoIterator<Item = (RecordId, &'a R)>,
    K: Eq + Hash + Clone,
    A: Accumulator<R>,
    F: Fn(&R) -> K,
{
    let mut aggregation = Aggregation::new();
    for (id, record) in records {
        aggregation.push(id, key_fn(record), record);
    }
    log::debug!(
        "aggregated {} records into {} groups",
        aggregation.record_count(),
        aggregation.len()
    );
    aggregation
}

// ============================================================================
// DISTINCT SET
// ============================================================================

/// Set of distinct entity identifiers (customers, trainers, classes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctSet(FxHashSet<String>);

impl DistinctSet {
    pub fn insert(&mut self, value: &str) {
        if !self.0.contains(value) {
            self.0.insert(value.to_string());
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Merge for DistinctSet {
    fn merge(&mut self, other: &Self) {
        for value in &other.0 {
            self.insert(value);
        }
    }
}

// ============================================================================
// DISCOUNT ACCUMULATOR
// ============================================================================

/// Running sums for one group of sales.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountAccumulator {
    pub total_transactions: u64,
    pub discounted_transactions: u64,
    pub total_revenue: f64,
    pub discounted_revenue: f64,
    pub discount_value: f64,
    /// Sum of discount percentages over discounted sales only.
    pub discount_percent_sum: f64,
    pub members: DistinctSet,
    pub discounted_members: DistinctSet,
}

impl Merge for DiscountAccumulator {
    fn merge(&mut self, other: &Self) {
        self.total_transactions += other.total_transactions;
        self.discounted_transactions += other.discounted_transactions;
        self.total_revenue += other.total_revenue;
        self.discounted_revenue += other.discounted_revenue;
        self.discount_value += other.discount_value;
        self.discount_percent_sum += other.discount_percent_sum;
        self.members.merge(&other.members);
        self.discounted_members.merge(&other.discounted_members);
    }
}

impl Accumulator<SaleRecord> for DiscountAccumulator {
    fn add(&mut self, sale: &SaleRecord) {
        let customer = sale.customer_key();

        self.total_transactions += 1;
        self.total_revenue += sale.payment_value;
        if let Some(customer) = customer {
            self.members.insert(customer);
        }

        if sale.is_discounted() {
            self.discounted_transactions += 1;
            self.discounted_revenue += sale.payment_value;
            self.discount_value += sale.discount_amount;
            self.discount_percent_sum += sale.discount_percentage;
            if let Some(customer) = customer {
                self.discounted_members.insert(customer);
            }
        }
    }
}

// ============================================================================
// SESSION ACCUMULATOR
// ============================================================================

/// Running sums for one group of class sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionAccumulator {
    pub sessions: u64,
    pub empty_sessions: u64,
    pub capacity: u64,
    pub checked_in: u64,
    pub booked: u64,
    pub late_cancelled: u64,
    pub revenue: f64,
    pub trainers: DistinctSet,
    pub classes: DistinctSet,
}

impl Merge for SessionAccumulator {
    fn merge(&mut self, other: &Self) {
        self.sessions += other.sessions;
        self.empty_sessions += other.empty_sessions;
        self.capacity += other.capacity;
        self.checked_in += other.checked_in;
        self.booked += other.booked;
        self.late_cancelled += other.late_cancelled;
        self.revenue += other.revenue;
        self.trainers.merge(&other.trainers);
        self.classes.merge(&other.classes);
    }
}

impl Accumulator<SessionRecord> for SessionAccumulator {
    fn add(&mut self, session: &SessionRecord) {
        self.sessions += 1;
        if session.is_empty() {
            self.empty_sessions += 1;
        }
        self.capacity += u64::from(session.capacity);
        self.checked_in += u64::from(session.checked_in);
        self.booked += u64::from(session.booked);
        self.late_cancelled += u64::from(session.late_cancelled);
        self.revenue += session.revenue;
        self.trainers.insert(session.dimension_or_sentinel(Dimension::Trainer));
        self.classes.insert(session.dimension_or_sentinel(Dimension::ClassType));
    }
}
