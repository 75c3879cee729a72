//! FILENAME: sheet-source/tests/test_sources.rs
//! Round trips through real files: workbooks written with rust_xlsxwriter and
//! JSON exports written to a temp dir.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Timelike};
use records::columns::{sales, sessions};
use records::RawValue;
use rust_xlsxwriter::Workbook;
use sheet_source::{
    load_records, load_sales, load_sessions, load_xlsx_records, xlsx_sheet_names, SourceError,
};
use tempfile::TempDir;

// ============================================================================
// HELPERS
// ============================================================================

/// 2024-01-05 10:15 as an Excel serial date.
fn create_test_serial() -> f64 {
    45296.0 + (10.0 * 60.0 + 15.0) / (24.0 * 60.0)
}

/// A workbook with a "Sales" sheet (blank padding row included) and a
/// "Sessions" sheet.
fn create_test_workbook(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("studio.xlsx");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Sales").unwrap();
    let headers = [
        sales::PAYMENT_DATE,
        sales::CLEANED_PRODUCT,
        sales::SOLD_BY,
        sales::PAYMENT_VALUE,
        sales::DISCOUNT_AMOUNT,
        sales::CUSTOMER_EMAIL,
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_number(1, 0, create_test_serial()).unwrap();
    sheet.write_string(1, 1, "Studio 8 Class Pack").unwrap();
    sheet.write_string(1, 2, "Imran Shaikh").unwrap();
    sheet.write_number(1, 3, 8000.0).unwrap();
    sheet.write_string(1, 4, "₹2,000").unwrap();
    sheet.write_string(1, 5, "riya@studio.test").unwrap();
    // row 2 left empty
    sheet.write_string(3, 0, "14/04/2025 16:20:00").unwrap();
    sheet.write_string(3, 1, "Studio Single Class").unwrap();
    sheet.write_string(3, 2, "-").unwrap();
    sheet.write_string(3, 3, "₹1,200").unwrap();
    sheet.write_number(3, 4, 300.0).unwrap();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Sessions").unwrap();
    let headers = [
        sessions::DATE,
        sessions::CLEANED_CLASS,
        sessions::CAPACITY,
        sessions::CHECKED_IN,
        sessions::TOTAL_PAID,
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "2025-02-03").unwrap();
    sheet.write_string(1, 1, "Studio PowerCycle").unwrap();
    sheet.write_number(1, 2, 14.0).unwrap();
    sheet.write_number(1, 3, 12.0).unwrap();
    sheet.write_string(1, 4, "₹6,000").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn create_test_json(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// XLSX
// ============================================================================

#[test]
fn test_sheet_names_in_workbook_order() {
    let dir = TempDir::new().unwrap();
    let path = create_test_workbook(&dir);

    assert_eq!(xlsx_sheet_names(&path).unwrap(), vec!["Sales", "Sessions"]);
}

#[test]
fn test_first_sheet_is_default_and_padding_rows_skipped() {
    let dir = TempDir::new().unwrap();
    let path = create_test_workbook(&dir);

    let rows = load_xlsx_records(&path, None).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get(sales::PAYMENT_VALUE), Some(&RawValue::Number(8000.0)));
    assert_eq!(rows[1].get(sales::SOLD_BY), Some(&RawValue::from("-")));
}

#[test]
fn test_load_sales_from_workbook() {
    let dir = TempDir::new().unwrap();
    let path = create_test_workbook(&dir);

    let records = load_sales(&path, Some("Sales")).unwrap();

    assert_eq!(records.len(), 2);

    let first = &records[0];
    let paid_at = first.paid_at.expect("serial date should parse");
    assert_eq!(paid_at.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!((paid_at.hour(), paid_at.minute()), (10, 15));
    assert_eq!(first.discount_amount, 2000.0);
    assert!(first.is_discounted());

    let second = &records[1];
    assert_eq!(second.sold_by, "Online/System");
    assert_eq!(second.payment_value, 1200.0);
    assert_eq!(second.discount_amount, 300.0);
    assert!(second.customer_key().is_none());
}

#[test]
fn test_load_sessions_from_named_sheet() {
    let dir = TempDir::new().unwrap();
    let path = create_test_workbook(&dir);

    let records = load_sessions(&path, Some("Sessions")).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].class_type, "Studio PowerCycle");
    assert_eq!(records[0].capacity, 14);
    assert_eq!(records[0].checked_in, 12);
    assert_eq!(records[0].revenue, 6000.0);
}

#[test]
fn test_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let path = create_test_workbook(&dir);

    let result = load_xlsx_records(&path, Some("Payroll"));
    assert!(matches!(result, Err(SourceError::SheetNotFound(name)) if name == "Payroll"));
}

#[test]
fn test_corrupt_workbook_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = create_test_json(&dir, "broken.xlsx", "not a zip archive");

    assert!(matches!(load_xlsx_records(&path, None), Err(SourceError::XlsxRead(_))));
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_load_sales_from_row_objects() {
    let dir = TempDir::new().unwrap();
    let path = create_test_json(
        &dir,
        "sales.json",
        r#"[
            {"Payment Date": "05/01/2024 10:15:00", "Payment Value": "₹8,000",
             "Discount Amount -Mrp- Payment Value": "₹2,000", "Customer Email": "riya@studio.test"},
            {"Payment Date": "18/01/2024", "Payment Value": 1500, "Sold By": "-"}
        ]"#,
    );

    let records = load_sales(&path, None).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].payment_value, 8000.0);
    assert_eq!(records[0].customer_key(), Some("riya@studio.test"));
    assert_eq!(records[1].sold_by, "Online/System");
    assert!(!records[1].is_discounted());
}

#[test]
fn test_load_records_from_value_grid() {
    let dir = TempDir::new().unwrap();
    let path = create_test_json(
        &dir,
        "sessions.json",
        r#"{"range": "Sessions!A1:C3", "values": [
            ["Date", "Cleaned Class", "Checked In"],
            ["2025-02-04", "Studio Barre 57", "9"],
            ["", "", ""]
        ]}"#,
    );

    let rows = load_records(&path, Some("ignored for json")).unwrap();
    assert_eq!(rows.len(), 1);

    let records = load_sessions(Path::new(&path), None).unwrap();
    assert_eq!(records[0].class_type, "Studio Barre 57");
    assert_eq!(records[0].checked_in, 9);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = create_test_json(&dir, "sales.csv", "Payment Date,Payment Value\n");

    assert!(matches!(load_records(&path, None), Err(SourceError::InvalidFormat(_))));
}
