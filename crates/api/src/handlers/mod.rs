pub mod alerts;
pub mod contract;
pub mod dashboard;
pub mod intervention;

use chrono::{NaiveDate, Utc};

/// Calendar day used as "today" by date-relative queries.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
