//! FILENAME: records/src/period.rs
//! Calendar periods used as the time half of every grouping key.
//!
//! All views group at month granularity. A record whose timestamp could not
//! be parsed lands in `Period::Undated` rather than being silently merged
//! into a real month.

use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// English month names, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

// ============================================================================
// PERIOD
// ============================================================================

/// A calendar month, or the bucket for records without a usable timestamp.
/// Ordering is chronological with `Undated` after every real month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    Month { year: i32, month: u32 },
    Undated,
}

impl Period {
    /// Month bucket for a timestamp; `None` maps to `Undated`.
    pub fn of(timestamp: Option<NaiveDateTime>) -> Self {
        match timestamp {
            Some(ts) => Period::Month {
                year: ts.year(),
                month: ts.month(),
            },
            None => Period::Undated,
        }
    }

    /// Stable sortable key, e.g. "2025-03".
    pub fn key(&self) -> String {
        match self {
            Period::Month { year, month } => format!("{:04}-{:02}", year, month),
            Period::Undated => "undated".to_string(),
        }
    }

    /// Human-readable label, e.g. "March 2025".
    pub fn label(&self) -> String {
        match self {
            Period::Month { year, month } => {
                format!("{} {}", month_name(*month), year)
            }
            Period::Undated => "Undated".to_string(),
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            Period::Month { year, .. } => Some(*year),
            Period::Undated => None,
        }
    }

    pub fn month_of_year(&self) -> Option<MonthOfYear> {
        match self {
            Period::Month { month, .. } => MonthOfYear::new(*month),
            Period::Undated => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

// ============================================================================
// MONTH OF YEAR
// ============================================================================

/// A calendar month independent of year (1 = January).
/// Used as the shared key when two years are compared side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthOfYear(u32);

impl MonthOfYear {
    pub fn new(month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(MonthOfYear(month))
        } else {
            None
        }
    }

    /// The twelve months in calendar order.
    pub fn all() -> [MonthOfYear; 12] {
        std::array::from_fn(|i| MonthOfYear(i as u32 + 1))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        month_name(self.0)
    }
}

impl fmt::Display for MonthOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(10, 30, 0))
    }

    #[test]
    fn test_period_key_and_label() {
        let p = Period::of(ts(2025, 3, 14));
        assert_eq!(p.key(), "2025-03");
        assert_eq!(p.label(), "March 2025");
        assert_eq!(p.year(), Some(2025));
        assert_eq!(p.month_of_year().map(|m| m.number()), Some(3));
    }

    #[test]
    fn test_undated_sorts_last() {
        let mut periods = vec![
            Period::Undated,
            Period::of(ts(2025, 1, 1)),
            Period::of(ts(2024, 12, 31)),
        ];
        periods.sort();
        assert_eq!(periods[0].key(), "2024-12");
        assert_eq!(periods[1].key(), "2025-01");
        assert_eq!(periods[2], Period::Undated);
        assert_eq!(Period::Undated.label(), "Undated");
    }

    #[test]
    fn test_month_of_year_canonical_order() {
        let months = MonthOfYear::all();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].to_string(), "January");
        assert_eq!(months[11].to_string(), "December");
        assert!(MonthOfYear::new(0).is_none());
        assert!(MonthOfYear::new(13).is_none());
    }
}
