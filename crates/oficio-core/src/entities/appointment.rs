//! Appointment entity - an optional scheduled visit for an accepted quote

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::value_objects::Snowflake;

/// Scheduled visit attached to an accepted quote. At most one per quote;
/// rescheduling replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Snowflake,
    pub quote_id: Snowflake,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        id: Snowflake,
        quote_id: Snowflake,
        scheduled_date: NaiveDate,
        scheduled_time: NaiveTime,
        location: String,
    ) -> Self {
        Self {
            id,
            quote_id,
            scheduled_date,
            scheduled_time,
            location,
            created_at: Utc::now(),
        }
    }

    /// Combined date and time of the visit
    pub fn scheduled_for(&self) -> chrono::NaiveDateTime {
        self.scheduled_date.and_time(self.scheduled_time)
    }
}
