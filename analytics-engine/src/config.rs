//! FILENAME: analytics-engine/src/config.rs
//! Dashboard-level defaults: initial date window, comparison years,
//! drill-down limit and default row sorts.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::definition::{DefaultWindow, DiscountSortKey, FilterSpec, RowSort, SessionSortKey};
use crate::error::ConfigError;

/// Default maximum number of records a drill-down returns.
pub const DEFAULT_DRILL_DOWN_LIMIT: usize = 1000;

/// The two calendar years a year-over-year view compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonYears {
    pub baseline: i32,
    pub current: i32,
}

impl Default for ComparisonYears {
    fn default() -> Self {
        ComparisonYears {
            baseline: 2024,
            current: 2025,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub default_window: DefaultWindow,
    pub comparison: ComparisonYears,
    pub drill_down_limit: usize,
    pub discount_sort: RowSort<DiscountSortKey>,
    pub session_sort: RowSort<SessionSortKey>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            default_window: DefaultWindow::default(),
            comparison: ComparisonYears::default(),
            drill_down_limit: DEFAULT_DRILL_DOWN_LIMIT,
            discount_sort: RowSort::default(),
            session_sort: RowSort::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Parses and validates a JSON config. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded analytics config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drill_down_limit == 0 {
            return Err(ConfigError::Invalid(
                "drill_down_limit must be at least 1".to_string(),
            ));
        }
        if self.comparison.baseline == self.comparison.current {
            return Err(ConfigError::Invalid(format!(
                "comparison years must differ (both are {})",
                self.comparison.baseline
            )));
        }
        Ok(())
    }

    /// The filter a fresh dashboard starts from.
    pub fn seed_filter(&self, today: NaiveDate) -> FilterSpec {
        FilterSpec::new().with_date_range(self.default_window.resolve(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DateRange, SortOrder};

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = AnalyticsConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.drill_down_limit, 1000);
        assert_eq!(config.comparison.baseline, 2024);
        assert_eq!(config.discount_sort.key, DiscountSortKey::DiscountValue);
        assert_eq!(config.discount_sort.order, SortOrder::Descending);
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "default_window": { "kind": "fixed", "start": "2025-01-01" },
            "comparison": { "baseline": 2023, "current": 2024 },
            "session_sort": { "key": "fill_rate" }
        }"#;
        let config = AnalyticsConfig::from_json(json).unwrap();

        assert_eq!(config.comparison.current, 2024);
        assert_eq!(config.session_sort.key, SessionSortKey::FillRate);
        assert_eq!(config.session_sort.order, SortOrder::Ascending);

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let spec = config.seed_filter(today);
        assert_eq!(spec.date_range.start, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(spec.date_range.end, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.json");
        std::fs::write(&path, r#"{ "drill_down_limit": 250 }"#).unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        assert_eq!(config.drill_down_limit, 250);
        assert_eq!(config.comparison, ComparisonYears::default());

        let missing = AnalyticsConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_seed_filter_uses_previous_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let spec = AnalyticsConfig::default().seed_filter(today);
        assert_eq!(spec.date_range, DateRange::previous_month(today));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = AnalyticsConfig::from_json(r#"{ "drill_down_limit": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AnalyticsConfig::from_json(r#"{ "comparison": { "baseline": 2025, "current": 2025 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AnalyticsConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
