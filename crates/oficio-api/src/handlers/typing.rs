//! Typing indicator handlers

use axum::{
    extract::{Path, State},
    Json,
};
use oficio_service::dto::{TyperResponse, TypingRequest};
use oficio_service::PresenceService;

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Publish (or explicitly stop) the caller's typing indicator
///
/// POST /conversations/{conversation_id}/typing
pub async fn publish_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<TypingRequest>,
) -> ApiResult<NoContent> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let service = PresenceService::new(state.service_context());
    if request.is_typing {
        service
            .start_typing(conversation_id, auth.user_id, &request.display_name)
            .await?;
    } else {
        service.stop_typing(conversation_id, auth.user_id).await?;
    }

    Ok(NoContent)
}

/// Everyone the viewer currently sees as typing
///
/// GET /conversations/{conversation_id}/typing
pub async fn get_typers(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<Vec<TyperResponse>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let typers = PresenceService::new(state.service_context())
        .typers(conversation_id, auth.user_id)
        .await?;

    Ok(Json(typers.into_iter().map(TyperResponse::from).collect()))
}
