//! FILENAME: records/src/normalize.rs
//! Record Normalizer - turns untyped sheet rows into canonical records.
//!
//! Every function here is total: malformed input never aborts a batch.
//! - dates that cannot be read become `None` (excluded by any date filter)
//! - numbers that cannot be read become 0, and amounts are clamped to >= 0
//! - missing or placeholder ("-") labels become a documented sentinel

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::{debug, trace};

use crate::columns::{sales, sessions};
use crate::raw::{RawRecord, RawValue};
use crate::record::{Dimension, SaleRecord, SessionRecord};

/// Sold-by value the sheet uses for self-serve sales.
const SYSTEM_PLACEHOLDER: &str = "-";

/// Sentinel for online / self-serve sales.
pub const ONLINE_SYSTEM: &str = "Online/System";

/// Currency symbols stripped before numeric parsing.
const CURRENCY_SYMBOLS: [char; 5] = ['₹', '$', '€', '£', '¥'];

/// Excel's day zero for serial dates (accounts for the 1900 leap-year bug).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

// ============================================================================
// NUMBERS
// ============================================================================

/// Parses a loosely typed number. Never fails: unreadable input is 0.
///
/// Text is cleaned of currency symbols, thousands separators and whitespace,
/// then the longest leading numeric prefix is read ("12.5%" reads as 12.5).
pub fn parse_number(value: &RawValue) -> f64 {
    let parsed = match value {
        RawValue::Empty => 0.0,
        RawValue::Boolean(b) => {
            if *b { 1.0 } else { 0.0 }
        }
        RawValue::Number(n) => *n,
        RawValue::Text(s) => parse_number_text(s),
    };

    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

fn parse_number_text(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();

    numeric_prefix(&cleaned).parse::<f64>().unwrap_or(0.0)
}

/// Returns the longest prefix of `s` that reads as a decimal number.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            end = frac_end;
            has_digits |= frac_end > frac_start;
        }
    }

    if !has_digits {
        return "";
    }

    // Exponent only counts when digits follow it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Non-negative amount; negative or unreadable input normalizes to 0.
pub fn parse_amount(value: &RawValue) -> f64 {
    let n = parse_number(value);
    if n < 0.0 {
        trace!("clamping negative amount {} to 0", n);
        0.0
    } else {
        n
    }
}

/// Non-negative whole count (capacity, attendance).
pub fn parse_count(value: &RawValue) -> u32 {
    let n = parse_amount(value).round();
    if n >= u32::MAX as f64 {
        u32::MAX
    } else {
        n as u32
    }
}

// ============================================================================
// DATES
// ============================================================================

/// Parses a timestamp cell. Returns `None` when nothing sensible can be read.
///
/// Accepted forms:
/// - `DD/MM/YYYY`, optionally followed by `HH:MM` or `HH:MM:SS`
///   (day-first whenever a `/` is present)
/// - `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS[.fff]]`, the same with a `T`
/// - RFC 3339 (`2025-03-14T10:00:00+05:30`), read as wall-clock time
/// - a number, read as an Excel serial date
pub fn parse_timestamp(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Text(s) => parse_timestamp_text(s),
        RawValue::Number(n) => excel_serial_to_datetime(*n),
        RawValue::Empty | RawValue::Boolean(_) => None,
    }
}

pub fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.contains('/') {
        parse_day_first(text)
    } else {
        parse_iso(text)
    }
}

fn parse_day_first(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let date_part = parts.next()?;
    let time_part = parts.next();

    let mut fields = date_part.split('/');
    let day: u32 = fields.next()?.trim().parse().ok()?;
    let month: u32 = fields.next()?.trim().parse().ok()?;
    let mut year: i32 = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    if year < 100 {
        year += 2000;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = time_part.and_then(parse_time).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Converts an Excel serial date (days since 1899-12-30) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // 2958465 is 9999-12-31, the last date Excel can represent.
    if !serial.is_finite() || serial <= 0.0 || serial > 2_958_465.0 {
        return None;
    }

    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_time(NaiveTime::MIN);
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

// ============================================================================
// TEXT
// ============================================================================

fn is_placeholder(value: &RawValue) -> bool {
    match value {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed == SYSTEM_PLACEHOLDER
        }
        RawValue::Empty => true,
        _ => false,
    }
}

/// A categorical label; missing or placeholder values become the sentinel.
fn label(raw: &RawRecord, column: &str, dimension: Dimension) -> String {
    match raw.get(column) {
        Some(value) if !is_placeholder(value) => value.display_value(),
        _ => dimension.sentinel().to_string(),
    }
}

/// An identifier or free-text field; missing values become empty.
fn identifier(raw: &RawRecord, column: &str) -> String {
    match raw.get(column) {
        Some(value) if !is_placeholder(value) => value.display_value(),
        _ => String::new(),
    }
}

/// "-" marks a self-serve sale; absence means nobody was recorded.
fn sold_by(raw: &RawRecord) -> String {
    match raw.get(sales::SOLD_BY) {
        Some(RawValue::Text(s)) if s.trim() == SYSTEM_PLACEHOLDER => ONLINE_SYSTEM.to_string(),
        Some(value) if !value.is_blank() => value.display_value(),
        _ => Dimension::SoldBy.sentinel().to_string(),
    }
}

fn amount(raw: &RawRecord, column: &str) -> f64 {
    raw.get(column).map(parse_amount).unwrap_or(0.0)
}

fn count(raw: &RawRecord, column: &str) -> u32 {
    raw.get(column).map(parse_count).unwrap_or(0)
}

fn timestamp(raw: &RawRecord, column: &str) -> Option<NaiveDateTime> {
    let value = raw.get(column)?;
    let parsed = parse_timestamp(value);
    if parsed.is_none() && !value.is_blank() {
        trace!("unreadable {} {:?}", column, value);
    }
    parsed
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Normalizes one sales-sheet row.
pub fn normalize_sale(raw: &RawRecord) -> SaleRecord {
    SaleRecord {
        member_id: identifier(raw, sales::MEMBER_ID),
        customer_name: identifier(raw, sales::CUSTOMER_NAME),
        customer_email: identifier(raw, sales::CUSTOMER_EMAIL),
        sale_item_id: identifier(raw, sales::SALE_ITEM_ID),
        payment_category: label(raw, sales::PAYMENT_CATEGORY, Dimension::PaymentCategory),
        membership_type: label(raw, sales::MEMBERSHIP_TYPE, Dimension::MembershipType),
        paid_at: timestamp(raw, sales::PAYMENT_DATE),
        payment_value: amount(raw, sales::PAYMENT_VALUE),
        paid_in_money_credits: amount(raw, sales::PAID_IN_MONEY_CREDITS),
        vat: amount(raw, sales::PAYMENT_VAT),
        payment_item: identifier(raw, sales::PAYMENT_ITEM),
        payment_status: label(raw, sales::PAYMENT_STATUS, Dimension::PaymentStatus),
        payment_method: label(raw, sales::PAYMENT_METHOD, Dimension::PaymentMethod),
        transaction_id: identifier(raw, sales::PAYMENT_TRANSACTION_ID),
        sold_by: sold_by(raw),
        sale_reference: identifier(raw, sales::SALE_REFERENCE),
        location: label(raw, sales::CALCULATED_LOCATION, Dimension::Location),
        product: label(raw, sales::CLEANED_PRODUCT, Dimension::Product),
        category: label(raw, sales::CLEANED_CATEGORY, Dimension::Category),
        host_id: identifier(raw, sales::HOST_ID),
        mrp_pre_tax: amount(raw, sales::MRP_PRE_TAX),
        mrp_post_tax: amount(raw, sales::MRP_POST_TAX),
        discount_amount: amount(raw, sales::DISCOUNT_AMOUNT),
        discount_percentage: amount(raw, sales::DISCOUNT_PERCENTAGE),
    }
}

/// Normalizes one sessions-sheet row.
pub fn normalize_session(raw: &RawRecord) -> SessionRecord {
    SessionRecord {
        session_id: identifier(raw, sessions::SESSION_ID),
        held_at: timestamp(raw, sessions::DATE),
        class_type: label(raw, sessions::CLEANED_CLASS, Dimension::ClassType),
        trainer: label(raw, sessions::TRAINER_NAME, Dimension::Trainer),
        location: label(raw, sessions::LOCATION, Dimension::Location),
        capacity: count(raw, sessions::CAPACITY),
        checked_in: count(raw, sessions::CHECKED_IN),
        booked: count(raw, sessions::BOOKED),
        late_cancelled: count(raw, sessions::LATE_CANCELLED),
        revenue: amount(raw, sessions::TOTAL_PAID),
    }
}

/// Normalizes a whole sales sheet, preserving row order.
pub fn normalize_sales(rows: &[RawRecord]) -> Vec<SaleRecord> {
    let records: Vec<SaleRecord> = rows.iter().map(normalize_sale).collect();
    let undated = records.iter().filter(|r| r.paid_at.is_none()).count();
    debug!("normalized {} sale rows ({} undated)", records.len(), undated);
    records
}

/// Normalizes a whole sessions sheet, preserving row order.
pub fn normalize_sessions(rows: &[RawRecord]) -> Vec<SessionRecord> {
    let records: Vec<SessionRecord> = rows.iter().map(normalize_session).collect();
    debug!("normalized {} session rows", records.len());
    records
}
