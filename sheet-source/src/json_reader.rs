//! FILENAME: sheet-source/src/json_reader.rs
//! JSON exports: an array of row objects, or a sheet value grid
//! (`{"range": "...", "values": [[header...], [cell...], ...]}`).

use records::{RawRecord, RawValue};
use serde::Deserialize;
use serde_json::Value;

use crate::grid::records_from_grid;
use crate::SourceError;

/// Value grid as returned by a spreadsheet service's values endpoint.
#[derive(Debug, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Parses `[{"Column": value, ...}, ...]`. Entries that are not objects
/// are skipped with a warning.
pub fn parse_json_records(json: &str) -> Result<Vec<RawRecord>, SourceError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(rows) = value else {
        return Err(SourceError::InvalidFormat(
            "expected a JSON array of row objects".to_string(),
        ));
    };

    Ok(records_from_row_objects(rows))
}

fn records_from_row_objects(rows: Vec<Value>) -> Vec<RawRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Value::Object(fields) => records.push(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, raw_value(value)))
                    .collect(),
            ),
            other => log::warn!("skipping row {}: not an object ({})", index, other),
        }
    }
    records
}

/// Parses a value grid whose first row is the header.
pub fn parse_sheet_values(json: &str) -> Result<Vec<RawRecord>, SourceError> {
    let sheet: SheetValues = serde_json::from_str(json)?;
    if let Some(range) = &sheet.range {
        log::debug!("parsing value grid for {}", range);
    }
    Ok(records_from_sheet_values(sheet))
}

pub fn records_from_sheet_values(sheet: SheetValues) -> Vec<RawRecord> {
    let grid = sheet
        .values
        .into_iter()
        .map(|row| row.into_iter().map(raw_value).collect::<Vec<_>>());
    records_from_grid(grid)
}

/// Detects which of the two JSON shapes `json` holds and parses it.
pub fn parse_json_any(json: &str) -> Result<Vec<RawRecord>, SourceError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(rows) => Ok(records_from_row_objects(rows)),
        Value::Object(fields) if fields.contains_key("values") => {
            let sheet: SheetValues = serde_json::from_value(Value::Object(fields))?;
            Ok(records_from_sheet_values(sheet))
        }
        _ => Err(SourceError::InvalidFormat(
            "expected a row array or an object with a \"values\" grid".to_string(),
        )),
    }
}

fn raw_value(value: Value) -> RawValue {
    match value {
        Value::Null => RawValue::Empty,
        Value::Bool(b) => RawValue::Boolean(b),
        Value::Number(n) => n.as_f64().map_or(RawValue::Empty, RawValue::Number),
        Value::String(s) => RawValue::Text(s),
        other => RawValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_objects() {
        let json = r#"[
            {"Payment Date": "05/01/2024 10:15:00", "Payment Value": "₹8,000", "Member ID": 10231},
            "stray text",
            {"Payment Date": null, "Sold By": "-"}
        ]"#;
        let records = parse_json_records(json).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Member ID"), Some(&RawValue::Number(10231.0)));
        assert_eq!(records[1].get("Payment Date"), Some(&RawValue::Empty));
        assert_eq!(records[1].get("Sold By"), Some(&RawValue::from("-")));
    }

    #[test]
    fn test_parse_sheet_values_grid() {
        let json = r#"{
            "range": "Sales!A1:C4",
            "majorDimension": "ROWS",
            "values": [
                ["Payment Date", "Cleaned Product", "Payment Value"],
                ["05/01/2024", "Studio 8 Class Pack", "8000"],
                ["18/01/2024", "Studio Single Class"],
                []
            ]
        }"#;
        let records = parse_sheet_values(json).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("Cleaned Product"), Some(&RawValue::from("Studio Single Class")));
        assert_eq!(records[1].get("Payment Value"), None);
    }

    #[test]
    fn test_detects_shape() {
        assert_eq!(parse_json_any(r#"[{"a": 1}]"#).unwrap().len(), 1);
        assert_eq!(parse_json_any(r#"{"values": [["a"], [1]]}"#).unwrap().len(), 1);
        assert!(matches!(parse_json_any(r#"{"rows": []}"#), Err(SourceError::InvalidFormat(_))));
        assert!(matches!(parse_json_any("{"), Err(SourceError::Json(_))));
        assert!(matches!(parse_json_records("{}"), Err(SourceError::InvalidFormat(_))));
    }
}
