//! PostgreSQL implementation of AppointmentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use oficio_core::entities::Appointment;
use oficio_core::traits::{AppointmentRepository, RepoResult};
use oficio_core::value_objects::Snowflake;

use crate::models::AppointmentModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AppointmentRepository
#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    #[instrument(skip(self))]
    async fn find_by_quote(&self, quote_id: Snowflake) -> RepoResult<Option<Appointment>> {
        let result = sqlx::query_as::<_, AppointmentModel>(
            r#"
            SELECT id, quote_id, scheduled_date, scheduled_time, location, created_at
            FROM appointments
            WHERE quote_id = $1
            "#,
        )
        .bind(quote_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Appointment::from))
    }

    #[instrument(skip(self, appointment))]
    async fn upsert(&self, appointment: &Appointment) -> RepoResult<()> {
        // One visit per quote; rescheduling replaces date, time and location
        sqlx::query(
            r#"
            INSERT INTO appointments (id, quote_id, scheduled_date, scheduled_time, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (quote_id) DO UPDATE
            SET scheduled_date = EXCLUDED.scheduled_date,
                scheduled_time = EXCLUDED.scheduled_time,
                location = EXCLUDED.location
            "#,
        )
        .bind(appointment.id.get())
        .bind(appointment.quote_id.get())
        .bind(appointment.scheduled_date)
        .bind(appointment.scheduled_time)
        .bind(&appointment.location)
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAppointmentRepository>();
    }
}
