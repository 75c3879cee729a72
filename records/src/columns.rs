//! FILENAME: records/src/columns.rs
//! Column headers of the source spreadsheets, exactly as they appear in row 1.

/// Headers of the sales sheet.
pub mod sales {
    pub const MEMBER_ID: &str = "Member ID";
    pub const CUSTOMER_NAME: &str = "Customer Name";
    pub const CUSTOMER_EMAIL: &str = "Customer Email";
    pub const SALE_ITEM_ID: &str = "Sale Item ID";
    pub const PAYMENT_CATEGORY: &str = "Payment Category";
    pub const MEMBERSHIP_TYPE: &str = "Membership Type";
    pub const PAYMENT_DATE: &str = "Payment Date";
    pub const PAYMENT_VALUE: &str = "Payment Value";
    pub const PAID_IN_MONEY_CREDITS: &str = "Paid In Money Credits";
    pub const PAYMENT_VAT: &str = "Payment VAT";
    pub const PAYMENT_ITEM: &str = "Payment Item";
    pub const PAYMENT_STATUS: &str = "Payment Status";
    pub const PAYMENT_METHOD: &str = "Payment Method";
    pub const PAYMENT_TRANSACTION_ID: &str = "Payment Transaction ID";
    pub const SOLD_BY: &str = "Sold By";
    pub const SALE_REFERENCE: &str = "Sale Reference";
    pub const CALCULATED_LOCATION: &str = "Calculated Location";
    pub const CLEANED_PRODUCT: &str = "Cleaned Product";
    pub const CLEANED_CATEGORY: &str = "Cleaned Category";
    pub const HOST_ID: &str = "Host Id";
    pub const MRP_PRE_TAX: &str = "Mrp - Pre Tax";
    pub const MRP_POST_TAX: &str = "Mrp - Post Tax";
    pub const DISCOUNT_AMOUNT: &str = "Discount Amount -Mrp- Payment Value";
    pub const DISCOUNT_PERCENTAGE: &str = "Discount Percentage - discount amount/mrp*100";
}

/// Headers of the sessions sheet.
pub mod sessions {
    pub const SESSION_ID: &str = "Session ID";
    pub const DATE: &str = "Date";
    pub const CLEANED_CLASS: &str = "Cleaned Class";
    pub const TRAINER_NAME: &str = "Trainer Name";
    pub const LOCATION: &str = "Location";
    pub const CAPACITY: &str = "Capacity";
    pub const CHECKED_IN: &str = "Checked In";
    pub const BOOKED: &str = "Booked";
    pub const LATE_CANCELLED: &str = "Late Cancelled";
    pub const TOTAL_PAID: &str = "Total Paid";
}
