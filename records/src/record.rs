//! FILENAME: records/src/record.rs
//! PURPOSE: Canonical, typed record shapes produced by the normalizer.
//! CONTEXT: Downstream stages never look fields up by header name. They go
//! through the `Fact` trait with a typed `Dimension` or `Measure`, so the
//! normalizer stays the single translation boundary from untyped input.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::period::Period;

// ============================================================================
// DIMENSIONS & MEASURES
// ============================================================================

/// Categorical fields a record can be filtered or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Product,
    Category,
    SoldBy,
    Location,
    PaymentMethod,
    PaymentCategory,
    MembershipType,
    PaymentStatus,
    ClassType,
    Trainer,
}

impl Dimension {
    /// Label used when a record carries no value for this dimension.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Dimension::Product => "Unknown Product",
            Dimension::Category => "Unknown Category",
            Dimension::SoldBy => "Unknown",
            Dimension::Location => "Unknown Location",
            Dimension::PaymentMethod => "Unknown Method",
            Dimension::PaymentCategory => "Unknown Payment Category",
            Dimension::MembershipType => "Unknown Membership",
            Dimension::PaymentStatus => "Unknown Status",
            Dimension::ClassType => "Unknown Class",
            Dimension::Trainer => "Unknown Trainer",
        }
    }

    /// Display name for column headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Product => "Product",
            Dimension::Category => "Category",
            Dimension::SoldBy => "Associate",
            Dimension::Location => "Location",
            Dimension::PaymentMethod => "Payment Method",
            Dimension::PaymentCategory => "Payment Category",
            Dimension::MembershipType => "Membership Type",
            Dimension::PaymentStatus => "Payment Status",
            Dimension::ClassType => "Class",
            Dimension::Trainer => "Trainer",
        }
    }
}

/// Numeric fields a record can be range-filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    PaymentValue,
    DiscountAmount,
    DiscountPercentage,
    Vat,
    NetRevenue,
    MrpPreTax,
    MrpPostTax,
    Capacity,
    CheckedIn,
    Booked,
    LateCancelled,
    SessionRevenue,
}

// ============================================================================
// FACT TRAIT
// ============================================================================

/// Typed field access shared by every record kind.
/// Kinds that do not carry a dimension or measure return `None` for it.
pub trait Fact {
    fn occurred_at(&self) -> Option<NaiveDateTime>;

    fn dimension(&self, dimension: Dimension) -> Option<&str>;

    fn measure(&self, measure: Measure) -> Option<f64>;

    fn period(&self) -> Period {
        Period::of(self.occurred_at())
    }

    /// Dimension value with the sentinel substituted when absent.
    fn dimension_or_sentinel(&self, dimension: Dimension) -> &str {
        self.dimension(dimension).unwrap_or_else(|| dimension.sentinel())
    }
}

// ============================================================================
// SALE RECORD
// ============================================================================

/// One payment line from the sales sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaleRecord {
    pub member_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub sale_item_id: String,
    pub payment_category: String,
    pub membership_type: String,

    /// `None` when the sheet's date could not be parsed.
    pub paid_at: Option<NaiveDateTime>,

    pub payment_value: f64,
    pub paid_in_money_credits: f64,
    pub vat: f64,
    pub payment_item: String,
    pub payment_status: String,
    pub payment_method: String,
    pub transaction_id: String,

    /// Associate who made the sale ("Online/System" for self-serve sales).
    pub sold_by: String,

    pub sale_reference: String,
    pub location: String,
    pub product: String,
    pub category: String,
    pub host_id: String,
    pub mrp_pre_tax: f64,
    pub mrp_post_tax: f64,

    /// MRP minus payment value.
    pub discount_amount: f64,

    /// Discount as a percentage of MRP.
    pub discount_percentage: f64,
}

impl SaleRecord {
    /// The one predicate every view uses to classify a sale as discounted.
    pub fn is_discounted(&self) -> bool {
        self.discount_amount > 0.0
    }

    pub fn net_revenue(&self) -> f64 {
        (self.payment_value - self.vat).max(0.0)
    }

    pub fn gross_revenue(&self) -> f64 {
        self.payment_value
    }

    /// Identity used for distinct-customer counts: email, then member id.
    pub fn customer_key(&self) -> Option<&str> {
        if !self.customer_email.is_empty() {
            Some(&self.customer_email)
        } else if !self.member_id.is_empty() {
            Some(&self.member_id)
        } else {
            None
        }
    }
}

impl Fact for SaleRecord {
    fn occurred_at(&self) -> Option<NaiveDateTime> {
        self.paid_at
    }

    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Product => Some(&self.product),
            Dimension::Category => Some(&self.category),
            Dimension::SoldBy => Some(&self.sold_by),
            Dimension::Location => Some(&self.location),
            Dimension::PaymentMethod => Some(&self.payment_method),
            Dimension::PaymentCategory => Some(&self.payment_category),
            Dimension::MembershipType => Some(&self.membership_type),
            Dimension::PaymentStatus => Some(&self.payment_status),
            Dimension::ClassType | Dimension::Trainer => None,
        }
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::PaymentValue => Some(self.payment_value),
            Measure::DiscountAmount => Some(self.discount_amount),
            Measure::DiscountPercentage => Some(self.discount_percentage),
            Measure::Vat => Some(self.vat),
            Measure::NetRevenue => Some(self.net_revenue()),
            Measure::MrpPreTax => Some(self.mrp_pre_tax),
            Measure::MrpPostTax => Some(self.mrp_post_tax),
            _ => None,
        }
    }
}

// ============================================================================
// SESSION RECORD
// ============================================================================

/// One scheduled class from the sessions sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub held_at: Option<NaiveDateTime>,
    pub class_type: String,
    pub trainer: String,
    pub location: String,
    pub capacity: u32,
    pub checked_in: u32,
    pub booked: u32,
    pub late_cancelled: u32,
    pub revenue: f64,
}

impl SessionRecord {
    /// A session nobody checked into.
    pub fn is_empty(&self) -> bool {
        self.checked_in == 0
    }
}

impl Fact for SessionRecord {
    fn occurred_at(&self) -> Option<NaiveDateTime> {
        self.held_at
    }

    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::ClassType => Some(&self.class_type),
            Dimension::Trainer => Some(&self.trainer),
            Dimension::Location => Some(&self.location),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Capacity => Some(f64::from(self.capacity)),
            Measure::CheckedIn => Some(f64::from(self.checked_in)),
            Measure::Booked => Some(f64::from(self.booked)),
            Measure::LateCancelled => Some(f64::from(self.late_cancelled)),
            Measure::SessionRevenue => Some(self.revenue),
            _ => None,
        }
    }
}
