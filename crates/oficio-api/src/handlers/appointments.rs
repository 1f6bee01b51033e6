//! Appointment handlers

use axum::{
    extract::{Path, State},
    Json,
};
use oficio_service::dto::{AppointmentResponse, ScheduleAppointmentRequest};
use oficio_service::AppointmentService;

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Professional schedules (or reschedules) the visit for an accepted quote
///
/// POST /quotes/{quote_id}/appointment
pub async fn schedule_visit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ScheduleAppointmentRequest>,
) -> ApiResult<Created<Json<AppointmentResponse>>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let appointment = AppointmentService::new(state.service_context())
        .schedule_visit(
            quote_id,
            auth.user_id,
            request.scheduled_date,
            request.scheduled_time,
            request.location,
        )
        .await?;

    Ok(Created(Json(AppointmentResponse::from(appointment))))
}

/// The quote's scheduled visit
///
/// GET /quotes/{quote_id}/appointment
pub async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<Json<AppointmentResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let appointment = AppointmentService::new(state.service_context())
        .get_for_quote(quote_id, auth.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::Service(oficio_service::ServiceError::not_found(
                "Appointment",
                quote_id.to_string(),
            ))
        })?;

    Ok(Json(AppointmentResponse::from(appointment)))
}
