//! Conversation handlers

use axum::{
    extract::{Path, State},
    Json,
};
use oficio_service::dto::{
    ConversationResponse, OpenConversationRequest, TimelineItemResponse, UnreadCountResponse,
};
use oficio_service::{ConversationService, ReadTracker, TimelineService};

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Open (create or get) a conversation with a professional
///
/// POST /conversations
pub async fn open_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<OpenConversationRequest>,
) -> ApiResult<Created<Json<ConversationResponse>>> {
    let service = ConversationService::new(state.service_context());
    let conversation = service
        .open_conversation(auth.user_id, request.professional_id, request.service_id)
        .await?;

    Ok(Created(Json(ConversationResponse::from(
        oficio_service::services::ConversationSummary {
            conversation,
            unread: 0,
        },
    ))))
}

/// The caller's conversation list with unread counts
///
/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let service = ConversationService::new(state.service_context());
    let summaries = service.list_conversations(auth.user_id).await?;

    Ok(Json(
        summaries.into_iter().map(ConversationResponse::from).collect(),
    ))
}

/// The merged message/quote timeline for one conversation
///
/// GET /conversations/{conversation_id}/timeline
pub async fn get_timeline(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<Vec<TimelineItemResponse>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let service = TimelineService::new(state.service_context());
    let items = service.timeline(conversation_id, auth.user_id).await?;

    Ok(Json(items.into_iter().map(TimelineItemResponse::from).collect()))
}

/// Clear the conversation for the caller only (watermark, not deletion)
///
/// DELETE /conversations/{conversation_id}
pub async fn clear_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<NoContent> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    ConversationService::new(state.service_context())
        .clear_conversation(conversation_id, auth.user_id)
        .await?;

    Ok(NoContent)
}

/// Acknowledge visibility: mark the conversation read
///
/// POST /conversations/{conversation_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<NoContent> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    ReadTracker::new(state.service_context())
        .mark_conversation_read(conversation_id, auth.user_id)
        .await?;

    Ok(NoContent)
}

/// The caller's unread badge total
///
/// GET /users/@me/unread
pub async fn unread_total(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let total = ReadTracker::new(state.service_context())
        .unread_total(auth.user_id)
        .await?;

    Ok(Json(UnreadCountResponse { total }))
}
