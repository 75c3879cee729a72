//! FILENAME: tests/common/mod.rs
//! Fixtures for analytics-engine integration tests.
//!
//! Fixtures are written as raw sheet rows and pushed through the normalizer,
//! so every test exercises the same path real spreadsheet data takes.

#![allow(dead_code)]

use records::columns::{sales, sessions};
use records::{normalize_sales, normalize_sessions, RawRecord, RawValue, SaleRecord, SessionRecord};

// ============================================================================
// SALES
// ============================================================================

pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<&'static str> {
        vec![
            sales::PAYMENT_DATE,
            sales::CLEANED_PRODUCT,
            sales::CLEANED_CATEGORY,
            sales::SOLD_BY,
            sales::CALCULATED_LOCATION,
            sales::PAYMENT_VALUE,
            sales::DISCOUNT_AMOUNT,
            sales::DISCOUNT_PERCENTAGE,
            sales::CUSTOMER_EMAIL,
        ]
    }

    /// (date, product, category, sold by, location, payment, discount, discount %, email)
    #[allow(clippy::type_complexity)]
    pub fn data() -> Vec<(
        &'static str,
        &'static str,
        &'static str,
        &'static str,
        &'static str,
        &'static str,
        &'static str,
        &'static str,
        &'static str,
    )> {
        vec![
            ("05/01/2024 10:15:00", "Studio 8 Class Pack", "Class Packages", "Imran Shaikh", "Kwality House, Kemps Corner", "₹8,000", "₹2,000", "20", "riya@studio.test"),
            ("18/01/2024 18:40:00", "Studio Single Class", "Class Packages", "-", "Kwality House, Kemps Corner", "₹1,500", "0", "0", "kabir@studio.test"),
            ("02/03/2024 07:05:00", "Studio Annual Unlimited", "Memberships", "Zaheer Agarbattiwala", "Supreme HQ, Bandra", "₹1,20,000", "₹30,000", "20", "riya@studio.test"),
            ("21/03/2024 09:30:00", "Studio 8 Class Pack", "Class Packages", "Imran Shaikh", "Supreme HQ, Bandra", "₹10,000", "0", "0", "meera@studio.test"),
            ("03/03/2025 12:00:00", "Studio 8 Class Pack", "Class Packages", "Imran Shaikh", "Kenkere House", "₹7,000", "₹3,000", "30", "meera@studio.test"),
            ("14/04/2025 16:20:00", "Studio Single Class", "Class Packages", "-", "Kenkere House", "₹1,200", "₹300", "20", "kabir@studio.test"),
            ("29/04/2025 08:45:00", "Studio Annual Unlimited", "Memberships", "Zaheer Agarbattiwala", "Supreme HQ, Bandra", "₹1,50,000", "0", "0", "anaya@studio.test"),
            ("not a date", "Studio Single Class", "", "", "", "₹1,500", "0", "0", ""),
        ]
    }

    pub fn rows() -> Vec<RawRecord> {
        let headers = Self::headers();
        Self::data()
            .into_iter()
            .map(|(date, product, category, sold_by, location, payment, discount, pct, email)| {
                let cells = [date, product, category, sold_by, location, payment, discount, pct, email];
                headers
                    .iter()
                    .zip(cells)
                    .map(|(header, cell)| (header.to_string(), RawValue::from(cell)))
                    .collect()
            })
            .collect()
    }

    pub fn records() -> Vec<SaleRecord> {
        normalize_sales(&Self::rows())
    }

    /// A large synthetic sales set for throughput-style tests.
    pub fn generated(count: usize) -> Vec<SaleRecord> {
        let products = ["Studio 8 Class Pack", "Studio Single Class", "Studio Annual Unlimited"];
        let associates = ["Imran Shaikh", "Zaheer Agarbattiwala", "Online/System"];
        (0..count)
            .map(|i| {
                let month = (i % 12) as u32 + 1;
                let discount = if i % 3 == 0 { 500.0 } else { 0.0 };
                SaleRecord {
                    paid_at: chrono::NaiveDate::from_ymd_opt(2024 + ((i / 12) % 2) as i32, month, 1 + (i % 28) as u32)
                        .and_then(|d| d.and_hms_opt(10, 0, 0)),
                    product: products[i % products.len()].to_string(),
                    sold_by: associates[i % associates.len()].to_string(),
                    location: "Supreme HQ, Bandra".to_string(),
                    payment_value: 1000.0 + (i % 7) as f64 * 250.0,
                    discount_amount: discount,
                    discount_percentage: if discount > 0.0 { 25.0 } else { 0.0 },
                    customer_email: format!("member{}@studio.test", i % 40),
                    ..Default::default()
                }
            })
            .collect()
    }
}

// ============================================================================
// SESSIONS
// ============================================================================

pub struct SessionFixture;

impl SessionFixture {
    pub fn headers() -> Vec<&'static str> {
        vec![
            sessions::DATE,
            sessions::CLEANED_CLASS,
            sessions::TRAINER_NAME,
            sessions::LOCATION,
            sessions::CAPACITY,
            sessions::CHECKED_IN,
            sessions::BOOKED,
            sessions::LATE_CANCELLED,
            sessions::TOTAL_PAID,
        ]
    }

    /// (date, class, trainer, location, capacity, checked in, booked, late cancelled, paid)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, &'static str, f64, f64, f64, f64, &'static str)> {
        vec![
            ("2025-02-03", "Studio PowerCycle", "Vivaran Dhasmana", "Supreme HQ, Bandra", 14.0, 12.0, 13.0, 1.0, "₹6,000"),
            ("2025-02-04", "Studio Barre 57", "Anisha Shah", "Kwality House, Kemps Corner", 12.0, 9.0, 10.0, 1.0, "₹4,500"),
            ("2025-02-05", "Studio Barre 57", "Anisha Shah", "Kwality House, Kemps Corner", 12.0, 0.0, 2.0, 2.0, "0"),
            ("2025-03-01", "Studio Mat 57", "Karan Bhatia", "Kenkere House", 10.0, 6.0, 6.0, 0.0, "₹3,000"),
        ]
    }

    pub fn rows() -> Vec<RawRecord> {
        let headers = Self::headers();
        Self::data()
            .into_iter()
            .map(|(date, class, trainer, location, capacity, checked_in, booked, late, paid)| {
                let cells = [
                    RawValue::from(date),
                    RawValue::from(class),
                    RawValue::from(trainer),
                    RawValue::from(location),
                    RawValue::from(capacity),
                    RawValue::from(checked_in),
                    RawValue::from(booked),
                    RawValue::from(late),
                    RawValue::from(paid),
                ];
                headers
                    .iter()
                    .zip(cells)
                    .map(|(header, cell)| (header.to_string(), cell))
                    .collect()
            })
            .collect()
    }

    pub fn records() -> Vec<SessionRecord> {
        normalize_sessions(&Self::rows())
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert two floats agree to within rounding noise.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}
