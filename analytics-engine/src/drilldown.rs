//! FILENAME: analytics-engine/src/drilldown.rs
//! Drill-Down Index - maps each group key back to its contributing records.
//!
//! Record ids are collected by the aggregator during its single pass, in
//! input order. An index belongs to one aggregation result and is replaced
//! wholesale whenever the view is rebuilt.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::filter::RecordId;

/// Record ids of one group. Most groups in a month-by-dimension view are small.
pub type RecordIds = SmallVec<[RecordId; 4]>;

#[derive(Debug, Clone)]
pub struct DrillDownIndex<K> {
    entries: FxHashMap<K, RecordIds>,
}

impl<K> Default for DrillDownIndex<K> {
    fn default() -> Self {
        DrillDownIndex {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: Eq + Hash> DrillDownIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (K, RecordIds)>,
    {
        DrillDownIndex {
            entries: groups.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Ids of the records behind `key`; empty for an unknown key.
    pub fn record_ids(&self, key: &K) -> &[RecordId] {
        self.entries.get(key).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// The records behind `key`, looked up in the slice the ids came from.
    pub fn resolve<'a, R>(&self, key: &K, source: &'a [R]) -> Vec<&'a R> {
        self.record_ids(key)
            .iter()
            .filter_map(|&id| source.get(id as usize))
            .collect()
    }

    /// At most `max_records` ids for `key`, with the full count.
    pub fn drill_down(&self, key: &K, max_records: usize) -> DrillDownResult<K>
    where
        K: Clone,
    {
        let ids = self.record_ids(key);
        let total_count = ids.len();
        let is_truncated = total_count > max_records;
        let record_ids = ids.iter().take(max_records).copied().collect();

        DrillDownResult {
            key: key.clone(),
            record_ids,
            total_count,
            is_truncated,
            max_records,
        }
    }
}

/// Result of a drill-down request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDownResult<K> {
    /// The group that was drilled into.
    pub key: K,
    /// Contributing record ids, in input order, capped at `max_records`.
    pub record_ids: Vec<RecordId>,
    /// Number of records behind the group before the cap.
    pub total_count: usize,
    pub is_truncated: bool,
    pub max_records: usize,
}

impl<K> DrillDownResult<K> {
    pub fn resolve<'a, R>(&self, source: &'a [R]) -> Vec<&'a R> {
        self.record_ids
            .iter()
            .filter_map(|&id| source.get(id as usize))
            .collect()
    }
}
