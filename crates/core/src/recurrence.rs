//! Recurrence date arithmetic.
//!
//! Everything here is pure: the next due date depends only on the reference
//! date and the rule.

use std::fmt;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

pub const FREQ_WEEKLY: &str = "weekly";
pub const FREQ_MONTHLY: &str = "monthly";
pub const FREQ_QUARTERLY: &str = "quarterly";
pub const FREQ_SEMIANNUAL: &str = "semiannual";
pub const FREQ_ANNUAL: &str = "annual";

/// All valid frequency values as stored in the database.
pub const VALID_FREQUENCIES: &[&str] = &[
    FREQ_WEEKLY,
    FREQ_MONTHLY,
    FREQ_QUARTERLY,
    FREQ_SEMIANNUAL,
    FREQ_ANNUAL,
];

/// Named visit frequency of a contract or site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Frequency {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            FREQ_WEEKLY => Ok(Self::Weekly),
            FREQ_MONTHLY => Ok(Self::Monthly),
            FREQ_QUARTERLY => Ok(Self::Quarterly),
            FREQ_SEMIANNUAL => Ok(Self::Semiannual),
            FREQ_ANNUAL => Ok(Self::Annual),
            _ => Err(format!(
                "Invalid frequency '{s}'. Must be one of: {}",
                VALID_FREQUENCIES.join(", ")
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => FREQ_WEEKLY,
            Self::Monthly => FREQ_MONTHLY,
            Self::Quarterly => FREQ_QUARTERLY,
            Self::Semiannual => FREQ_SEMIANNUAL,
            Self::Annual => FREQ_ANNUAL,
        }
    }

    /// Calendar months per period. `None` for the week-based frequency.
    fn months(self) -> Option<u32> {
        match self {
            Self::Weekly => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Semiannual => Some(6),
            Self::Annual => Some(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return the date one period after `reference`.
///
/// A positive `custom_days` overrides the named frequency and advances by
/// that many days. Month-based frequencies add whole calendar months; a day
/// of month that does not exist in the target month is clamped to its last
/// day (Jan 31 + 1 month = Feb 28/29).
///
/// Returns `None` only when the result falls outside chrono's date range.
pub fn next_date(
    reference: NaiveDate,
    frequency: Frequency,
    custom_days: Option<i32>,
) -> Option<NaiveDate> {
    if let Some(days) = custom_days.filter(|d| *d > 0) {
        return reference.checked_add_days(Days::new(u64::from(days.unsigned_abs())));
    }

    match frequency.months() {
        Some(months) => reference.checked_add_months(Months::new(months)),
        None => reference.checked_add_days(Days::new(7)),
    }
}

/// A fully resolved recurrence: frequency plus optional day-count override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub custom_days: Option<i32>,
}

impl Recurrence {
    pub fn new(frequency: Frequency, custom_days: Option<i32>) -> Self {
        Self {
            frequency,
            custom_days,
        }
    }

    /// See [`next_date`].
    pub fn next_after(&self, reference: NaiveDate) -> Option<NaiveDate> {
        next_date(reference, self.frequency, self.custom_days)
    }
}
