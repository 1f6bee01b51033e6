//! Appointment entity <-> model mapper

use oficio_core::entities::Appointment;
use oficio_core::value_objects::Snowflake;

use crate::models::AppointmentModel;

impl From<AppointmentModel> for Appointment {
    fn from(model: AppointmentModel) -> Self {
        Appointment {
            id: Snowflake::new(model.id),
            quote_id: Snowflake::new(model.quote_id),
            scheduled_date: model.scheduled_date,
            scheduled_time: model.scheduled_time,
            location: model.location,
            created_at: model.created_at,
        }
    }
}
