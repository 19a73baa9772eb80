/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All audit timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (planned, completed, contract bounds) carry no time zone.
pub type Date = chrono::NaiveDate;
