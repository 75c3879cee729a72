//! FILENAME: sheet-source/src/lib.rs
//! Studio Sheet Source
//!
//! Loads the sales and sessions sheets from spreadsheet exports and hands
//! them to the normalizer. Supported inputs: `.xlsx`/`.xlsm` workbooks,
//! JSON arrays of row objects and JSON value grids.

mod error;
mod grid;
mod json_reader;
mod xlsx_reader;

pub use error::SourceError;
pub use grid::records_from_grid;
pub use json_reader::{
    parse_json_any, parse_json_records, parse_sheet_values, records_from_sheet_values, SheetValues,
};
pub use xlsx_reader::{load_xlsx_records, xlsx_sheet_names};

use std::path::Path;

use records::{normalize_sales, normalize_sessions, RawRecord, SaleRecord, SessionRecord};

// ============================================================================
// FORMAT DISPATCH
// ============================================================================

/// Export formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
            "json" => Ok(SourceFormat::Json),
            "" => Err(SourceError::InvalidFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(SourceError::InvalidFormat(format!(
                "unsupported file extension '.{}'",
                other
            ))),
        }
    }
}

/// Reads raw records from any supported export. `sheet` selects a
/// worksheet in a workbook and is ignored for JSON.
pub fn load_records(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRecord>, SourceError> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Xlsx => load_xlsx_records(path, sheet),
        SourceFormat::Json => {
            let json = std::fs::read_to_string(path)?;
            parse_json_any(&json)
        }
    }
}

// ============================================================================
// TYPED LOADERS
// ============================================================================

pub fn load_sales(path: &Path, sheet: Option<&str>) -> Result<Vec<SaleRecord>, SourceError> {
    let rows = load_records(path, sheet)?;
    let records = normalize_sales(&rows);
    log::info!("loaded {} sales from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_sessions(path: &Path, sheet: Option<&str>) -> Result<Vec<SessionRecord>, SourceError> {
    let rows = load_records(path, sheet)?;
    let records = normalize_sessions(&rows);
    log::info!("loaded {} sessions from {}", records.len(), path.display());
    Ok(records)
}
