//! Message handlers

use axum::{
    extract::{Path, State},
    Json,
};
use oficio_service::dto::{MessageResponse, SendFileMessageRequest, SendMessageRequest};
use oficio_service::MessageService;

use crate::extractors::{parse_id, AuthUser, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Page through a conversation's messages
///
/// GET /conversations/{conversation_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let service = MessageService::new(state.service_context());
    let messages = service
        .list_messages(conversation_id, auth.user_id, pagination.into())
        .await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// Send a text message
///
/// POST /conversations/{conversation_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let service = MessageService::new(state.service_context());
    let message = service
        .send_message(conversation_id, auth.user_id, request.content, request.reply_to_id)
        .await?;

    Ok(Created(Json(MessageResponse::from(message))))
}

/// Send an uploaded file (optionally captioned)
///
/// POST /conversations/{conversation_id}/files
pub async fn send_file_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SendFileMessageRequest>,
) -> ApiResult<Created<Json<Vec<MessageResponse>>>> {
    let conversation_id = parse_id(&conversation_id, "conversation_id")?;

    let service = MessageService::new(state.service_context());
    let messages = service
        .send_file_message(
            conversation_id,
            auth.user_id,
            request.kind,
            request.file_url,
            request.file_name,
            request.caption,
        )
        .await?;

    Ok(Created(Json(
        messages.into_iter().map(MessageResponse::from).collect(),
    )))
}

/// Delete one of the caller's own messages
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<NoContent> {
    let message_id = parse_id(&message_id, "message_id")?;

    MessageService::new(state.service_context())
        .delete_message(message_id, auth.user_id)
        .await?;

    Ok(NoContent)
}
