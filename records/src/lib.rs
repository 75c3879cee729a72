//! FILENAME: records/src/lib.rs
//! PURPOSE: Record model for the studio analytics workspace.
//! CONTEXT: Raw spreadsheet rows come in, canonical typed records go out.
//! Everything downstream (filtering, grouping, metrics) works on the types
//! re-exported here.

pub mod columns;
pub mod normalize;
pub mod period;
pub mod raw;
pub mod record;

pub use normalize::{
    normalize_sale, normalize_sales, normalize_session, normalize_sessions, parse_amount,
    parse_number, parse_timestamp, ONLINE_SYSTEM,
};
pub use period::{MonthOfYear, Period, MONTH_NAMES};
pub use raw::{RawRecord, RawValue};
pub use record::{Dimension, Fact, Measure, SaleRecord, SessionRecord};
