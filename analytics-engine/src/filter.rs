//! FILENAME: analytics-engine/src/filter.rs
//! Filter Engine - selects the records that satisfy a `FilterSpec`.
//!
//! A selection never copies records. It holds the source slice plus the
//! surviving record ids in source order, so refining a selection and
//! resolving drill-down ids both index the same slice.

use std::collections::BTreeSet;

use records::{Dimension, Fact};

use crate::definition::FilterSpec;

/// Position of a record in the source slice. A selection addresses at most
/// `RecordId::MAX` records; any beyond that are left out.
pub type RecordId = u32;

/// Number of leading records of a `len`-long slice that ids can address.
fn addressable(len: usize) -> RecordId {
    RecordId::try_from(len).unwrap_or_else(|_| {
        log::warn!(
            "{} records exceed the id range, keeping the first {}",
            len,
            RecordId::MAX
        );
        RecordId::MAX
    })
}

// ============================================================================
// COMPILED FILTER
// ============================================================================

/// A `FilterSpec` with its keywords lowercased once, ready to test records.
struct Compiled<'s> {
    spec: &'s FilterSpec,
    keywords: Vec<(Dimension, Vec<String>)>,
}

impl<'s> Compiled<'s> {
    fn new(spec: &'s FilterSpec) -> Self {
        let keywords = spec
            .keywords
            .iter()
            .filter(|(_, words)| !words.is_empty())
            .map(|(dimension, words)| {
                let lowered = words.iter().map(|w| w.to_lowercase()).collect();
                (*dimension, lowered)
            })
            .collect();
        Compiled { spec, keywords }
    }

    fn matches<R: Fact>(&self, record: &R) -> bool {
        if !self.spec.date_range.contains(record.occurred_at()) {
            return false;
        }

        for (dimension, allowed) in &self.spec.allowed {
            if allowed.is_empty() {
                continue;
            }
            match record.dimension(*dimension) {
                Some(value) if allowed.contains(value) => {}
                _ => return false,
            }
        }

        for (measure, bounds) in &self.spec.bounds {
            if bounds.is_unbounded() {
                continue;
            }
            match record.measure(*measure) {
                Some(value) if bounds.contains(value) => {}
                _ => return false,
            }
        }

        for (dimension, words) in &self.keywords {
            let Some(value) = record.dimension(*dimension) else {
                return false;
            };
            let value = value.to_lowercase();
            if !words.iter().any(|w| value.contains(w.as_str())) {
                return false;
            }
        }

        true
    }
}

impl FilterSpec {
    /// Tests a single record. Prefer `filter` for collections, which
    /// prepares the keyword lists once.
    pub fn matches<R: Fact>(&self, record: &R) -> bool {
        Compiled::new(self).matches(record)
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// An ordered subset of a source slice.
#[derive(Debug)]
pub struct Filtered<'a, R> {
    source: &'a [R],
    ids: Vec<RecordId>,
}

impl<'a, R> Clone for Filtered<'a, R> {
    fn clone(&self) -> Self {
        Filtered {
            source: self.source,
            ids: self.ids.clone(),
        }
    }
}

impl<'a, R> Filtered<'a, R> {
    /// Every record of the source, in order.
    pub fn all(source: &'a [R]) -> Self {
        Filtered {
            source,
            ids: (0..addressable(source.len())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// The full slice the ids point into.
    pub fn source(&self) -> &'a [R] {
        self.source
    }

    /// Surviving records paired with their source ids.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &'a R)> + '_ {
        let source = self.source;
        self.ids
            .iter()
            .filter_map(move |&id| source.get(id as usize).map(|record| (id, record)))
    }

    pub fn records(&self) -> impl Iterator<Item = &'a R> + '_ {
        self.iter().map(|(_, record)| record)
    }

    /// Narrows the selection with an arbitrary predicate.
    pub fn retain<F>(&self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool,
    {
        let ids = self
            .iter()
            .filter(|(_, record)| predicate(*record))
            .map(|(id, _)| id)
            .collect();
        Filtered {
            source: self.source,
            ids,
        }
    }
}

impl<'a, R: Fact> Filtered<'a, R> {
    /// Applies a further spec to this selection. The result is always a
    /// subset of `self`.
    pub fn refine(&self, spec: &FilterSpec) -> Self {
        let compiled = Compiled::new(spec);
        self.retain(|record| compiled.matches(record))
    }
}

/// Selects every record of `records` that satisfies `spec`, preserving order.
pub fn filter<'a, R: Fact>(records: &'a [R], spec: &FilterSpec) -> Filtered<'a, R> {
    let selection = if spec.is_unrestricted() {
        Filtered::all(records)
    } else {
        Filtered::all(records).refine(spec)
    };
    log::debug!(
        "filter kept {} of {} records",
        selection.len(),
        records.len()
    );
    selection
}

/// The sorted set of values `dimension` takes across `records`.
/// Records that do not carry the dimension, or carry an empty value, are skipped.
pub fn distinct_values<'a, R, I>(records: I, dimension: Dimension) -> Vec<String>
where
    R: Fact + 'a,
    I: IntoIterator<Item = &'a R>,
{
    records
        .into_iter()
        .filter_map(|record| record.dimension(dimension))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DateRange;
    use chrono::NaiveDate;
    use records::{Measure, SaleRecord, SessionRecord};

    fn create_test_sale(day: u32, location: &str, product: &str, discount: f64) -> SaleRecord {
        SaleRecord {
            paid_at: NaiveDate::from_ymd_opt(2025, 3, day).and_then(|d| d.and_hms_opt(10, 0, 0)),
            location: location.to_string(),
            product: product.to_string(),
            payment_value: 1000.0,
            discount_amount: discount,
            ..Default::default()
        }
    }

    fn create_test_sales() -> Vec<SaleRecord> {
        vec![
            create_test_sale(1, "Kwality House, Kemps Corner", "Studio 8 Class Pack", 0.0),
            create_test_sale(10, "Supreme HQ, Bandra", "Studio Single Class", 250.0),
            create_test_sale(20, "Kenkere House", "Studio 8 Class Pack", 500.0),
            create_test_sale(31, "Supreme HQ, Bandra", "Studio Annual Unlimited", 1200.0),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_spec_keeps_everything_in_order() {
        let sales = create_test_sales();
        let selection = filter(&sales, &FilterSpec::new());
        assert_eq!(selection.ids(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_allowed_values_and_bounds_combine() {
        let sales = create_test_sales();
        let spec = FilterSpec::new()
            .allow(Dimension::Location, ["Supreme HQ, Bandra"])
            .bound(Measure::DiscountAmount, Some(300.0), None);

        let selection = filter(&sales, &spec);
        assert_eq!(selection.ids(), &[3]);
    }

    #[test]
    fn test_numeric_bounds_are_inclusive() {
        let mut sales = create_test_sales();
        sales.truncate(3);
        for (sale, value) in sales.iter_mut().zip([100.0, 200.0, 300.0]) {
            sale.payment_value = value;
        }
        let spec = FilterSpec::new().bound(Measure::PaymentValue, Some(100.0), Some(200.0));

        assert_eq!(filter(&sales, &spec).ids(), &[0, 1]);
    }

    #[test]
    fn test_addressable_caps_at_id_range() {
        assert_eq!(addressable(0), 0);
        assert_eq!(addressable(42), 42);
        assert_eq!(addressable(RecordId::MAX as usize), RecordId::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_addressable_saturates_past_id_range() {
        assert_eq!(addressable(RecordId::MAX as usize + 10), RecordId::MAX);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let sales = create_test_sales();
        let spec = FilterSpec::new().with_date_range(DateRange::between(date(2025, 3, 10), date(2025, 3, 20)));
        assert_eq!(filter(&sales, &spec).ids(), &[1, 2]);
    }

    #[test]
    fn test_inverted_range_yields_empty() {
        let sales = create_test_sales();
        let spec = FilterSpec::new()
            .with_date_range(DateRange::between(date(2025, 3, 31), date(2025, 3, 1)))
            .bound(Measure::PaymentValue, Some(10.0), Some(5.0));
        assert!(filter(&sales, &spec).is_empty());
    }

    #[test]
    fn test_undated_record_fails_bounded_range() {
        let mut sales = create_test_sales();
        sales[0].paid_at = None;
        let spec = FilterSpec::new().with_date_range(DateRange::new(Some(date(2025, 1, 1)), None));
        assert_eq!(filter(&sales, &spec).ids(), &[1, 2, 3]);
    }

    #[test]
    fn test_keywords_are_case_insensitive_any_of() {
        let sessions = vec![
            SessionRecord { class_type: "Studio PowerCycle".to_string(), ..Default::default() },
            SessionRecord { class_type: "Studio Barre 57".to_string(), ..Default::default() },
            SessionRecord { class_type: "Studio Mat 57".to_string(), ..Default::default() },
        ];
        let spec = FilterSpec::new()
            .keyword(Dimension::ClassType, "POWERCYCLE")
            .keyword(Dimension::ClassType, "barre");

        assert_eq!(filter(&sessions, &spec).ids(), &[0, 1]);
    }

    #[test]
    fn test_missing_dimension_fails_non_empty_allow_list() {
        let sessions = vec![SessionRecord::default()];
        let spec = FilterSpec::new().allow(Dimension::Product, ["Studio Single Class"]);
        assert!(filter(&sessions, &spec).is_empty());
    }

    #[test]
    fn test_refine_is_subset() {
        let sales = create_test_sales();
        let broad = filter(&sales, &FilterSpec::new().bound(Measure::DiscountAmount, Some(1.0), None));
        let narrow = broad.refine(&FilterSpec::new().allow(Dimension::Product, ["Studio 8 Class Pack"]));

        assert_eq!(broad.ids(), &[1, 2, 3]);
        assert_eq!(narrow.ids(), &[2]);
        assert!(narrow.ids().iter().all(|id| broad.ids().contains(id)));
    }

    #[test]
    fn test_distinct_values_sorted_and_deduplicated() {
        let sales = create_test_sales();
        let locations = distinct_values(&sales, Dimension::Location);
        assert_eq!(
            locations,
            vec!["Kenkere House", "Kwality House, Kemps Corner", "Supreme HQ, Bandra"]
        );
    }
}
