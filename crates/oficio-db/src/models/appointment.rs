//! Appointment database model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// Database model for the appointments table
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentModel {
    pub id: i64,
    pub quote_id: i64,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
    pub created_at: DateTime<Utc>,
}
