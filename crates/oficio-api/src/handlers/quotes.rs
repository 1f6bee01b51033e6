//! Quote handlers

use axum::{
    extract::{Path, State},
    Json,
};
use oficio_core::value_objects::Price;
use oficio_service::dto::{CreateQuoteRequest, QuoteResponse, RespondQuoteRequest};
use oficio_service::QuoteService;

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Professional sends a quote into the conversation
///
/// POST /conversations/{conversation_id}/quotes
pub async fn create_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateQuoteRequest>,
) -> ApiResult<Created<Json<QuoteResponse>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;
    let price = Price::from_centavos(request.price_centavos)
        .map_err(|e| ApiError::invalid_body(e.to_string()))?;

    let service = QuoteService::new(state.service_context());
    let quote = service
        .create_quote(conversation_id, auth.user_id, request.title, price)
        .await?;

    Ok(Created(Json(QuoteResponse::from(quote))))
}

/// All quotes of a conversation
///
/// GET /conversations/{conversation_id}/quotes
pub async fn list_quotes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<Vec<QuoteResponse>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let service = QuoteService::new(state.service_context());
    let quotes = service.list_quotes(conversation_id, auth.user_id).await?;

    Ok(Json(quotes.into_iter().map(QuoteResponse::from).collect()))
}

/// One quote
///
/// GET /quotes/{quote_id}
pub async fn get_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<Json<QuoteResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let quote = QuoteService::new(state.service_context())
        .get_quote(quote_id, auth.user_id)
        .await?;

    Ok(Json(QuoteResponse::from(quote)))
}

/// Client accepts or rejects a pending quote
///
/// POST /quotes/{quote_id}/respond
pub async fn respond_to_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
    ValidatedJson(request): ValidatedJson<RespondQuoteRequest>,
) -> ApiResult<Json<QuoteResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let quote = QuoteService::new(state.service_context())
        .respond_to_quote(quote_id, auth.user_id, request.decision, request.response_text)
        .await?;

    Ok(Json(QuoteResponse::from(quote)))
}

/// Either party withdraws the quote
///
/// POST /quotes/{quote_id}/cancel
pub async fn cancel_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<Json<QuoteResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let quote = QuoteService::new(state.service_context())
        .cancel_quote(quote_id, auth.user_id)
        .await?;

    Ok(Json(QuoteResponse::from(quote)))
}

/// Professional marks the service as done
///
/// POST /quotes/{quote_id}/complete
pub async fn complete_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<String>,
) -> ApiResult<Json<QuoteResponse>> {
    let quote_id = parse_id(&quote_id, "quote_id")?;

    let quote = QuoteService::new(state.service_context())
        .complete_service(quote_id, auth.user_id)
        .await?;

    Ok(Json(QuoteResponse::from(quote)))
}
