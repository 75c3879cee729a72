//! FILENAME: records/src/raw.rs
//! PURPOSE: Loosely typed input rows as they arrive from the spreadsheet source.
//! CONTEXT: A `RawRecord` is one spreadsheet row keyed by column header. Values
//! are whatever the sheet held: text, numbers, booleans or nothing at all.
//! The normalizer is the only consumer that interprets them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single loosely typed cell value.
/// Deserializes from plain JSON scalars (`null` becomes `Empty`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// True for `Empty` and for text that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the value rendered as text.
    /// Whole numbers are printed without a fractional part so that numeric
    /// identifiers ("Member ID" = 12345) come out as "12345", not "12345.0".
    pub fn display_value(&self) -> String {
        match self {
            RawValue::Empty => String::new(),
            RawValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Boolean(b) => {
                if *b { "TRUE" } else { "FALSE" }.to_string()
            }
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::Empty
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Boolean(value)
    }
}

// ============================================================================
// RAW RECORD
// ============================================================================

/// One untyped input row: column header -> value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: FxHashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        RawRecord {
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<RawValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Looks up a field by its exact header. Absent fields return `None`.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every field is blank (spreadsheet padding rows).
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(RawValue::is_blank)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        RawRecord {
            fields: iter.into_iter().collect(),
        }
    }
}
