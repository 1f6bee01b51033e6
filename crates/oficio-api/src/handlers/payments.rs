//! Payment handlers
//!
//! Confirmation is payment-gated: POST /quotes/{id}/confirm starts (or
//! resumes) the flow and the server-side watcher polls the gateway while
//! the payment view stays open. Closing the view stops the watcher.

use axum::{
    extract::{Path, State},
    Json,
};
use oficio_service::dto::{CollectIdentityRequest, PaymentInitiationResponse, PaymentSessionResponse};
use oficio_service::{PaymentCoordinator, QuoteService};

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Client confirms the completed service, starting the payment flow
///
/// POST /quotes/{quote_id}/confirm
pub async fn confirm_completion(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<Json<PaymentInitiationResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let outcome = QuoteService::new(state.service_context())
        .confirm_completion(quote_id, auth.user_id)
        .await?;

    Ok(Json(PaymentInitiationResponse::from(outcome)))
}

/// Current payment session for the quote's payment view
///
/// GET /quotes/{quote_id}/payment
pub async fn payment_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<Json<PaymentSessionResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let session = PaymentCoordinator::new(state.service_context())
        .payment_status(quote_id, auth.user_id)
        .await?;

    Ok(Json(PaymentSessionResponse::from(session)))
}

/// Payment view closed: stop the quote's status watcher
///
/// DELETE /quotes/{quote_id}/payment
pub async fn close_payment_view(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<NoContent> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let coordinator = PaymentCoordinator::new(state.service_context());
    // Only a participant may touch the watcher
    coordinator.payment_status(quote_id, auth.user_id).await?;
    coordinator.close_payment_view(quote_id);

    Ok(NoContent)
}

/// Collect the payer's identity document, unblocking payment initiation
///
/// POST /identity
pub async fn collect_identity(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CollectIdentityRequest>,
) -> ApiResult<NoContent> {
    PaymentCoordinator::new(state.service_context())
        .submit_identity(auth.user_id, &request.document)
        .await?;

    Ok(NoContent)
}
