//! FILENAME: sheet-source/src/xlsx_reader.rs

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use records::{RawRecord, RawValue};

use crate::grid::records_from_grid;
use crate::SourceError;

/// Names of the worksheets in an xlsx file, in workbook order.
pub fn xlsx_sheet_names(path: &Path) -> Result<Vec<String>, SourceError> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Reads one worksheet as header-keyed records. `sheet` defaults to the
/// first worksheet. Date cells come through as Excel serial numbers.
pub fn load_xlsx_records(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRecord>, SourceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or_else(|| {
            SourceError::InvalidFormat("Workbook contains no sheets".to_string())
        })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SourceError::InvalidFormat(e.to_string()))?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(raw_value).collect::<Vec<_>>());
    let records = records_from_grid(grid);

    log::debug!("read {} rows from sheet '{}'", records.len(), sheet_name);
    Ok(records)
}

fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Bool(b) => RawValue::Boolean(*b),
        Data::Error(_) => RawValue::Empty,
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => RawValue::Text(s.clone()),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
    }
}
