//! FILENAME: sheet-source/src/grid.rs
//! Header-row grids to raw records. Shared by every source format.

use records::{RawRecord, RawValue};

/// Turns a grid whose first row holds the column headers into records.
///
/// Columns with a blank header are dropped. Short rows simply lack the
/// trailing fields. Rows with no non-blank cell are skipped.
pub fn records_from_grid<I>(rows: I) -> Vec<RawRecord>
where
    I: IntoIterator<Item = Vec<RawValue>>,
{
    let mut rows = rows.into_iter();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| {
            let name = cell.display_value();
            (!name.is_empty()).then_some(name)
        })
        .collect();

    let mut records = Vec::new();
    let mut blank_rows = 0usize;
    for row in rows {
        let record: RawRecord = headers
            .iter()
            .zip(row)
            .filter_map(|(header, value)| header.as_ref().map(|h| (h.clone(), value)))
            .collect();
        if record.is_blank() {
            blank_rows += 1;
            continue;
        }
        records.push(record);
    }

    if blank_rows > 0 {
        log::debug!("skipped {} blank rows", blank_rows);
    }
    records
}
