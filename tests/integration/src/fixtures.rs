//! Test fixtures and data generators
//!
//! Unique user ids per test plus the wire-format request/response shapes.

use std::sync::atomic::{AtomicI64, Ordering};

use oficio_core::Snowflake;
use serde::{Deserialize, Serialize};

/// Counter for unique test ids
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// A fresh user id for test data, unique across concurrent tests
pub fn unique_user_id() -> Snowflake {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let millis = chrono::Utc::now().timestamp_millis();
    Snowflake::new(millis * 10_000 + n)
}

/// A client/professional pair for one test scenario
#[derive(Debug, Clone, Copy)]
pub struct ContactPair {
    pub client: Snowflake,
    pub professional: Snowflake,
}

impl ContactPair {
    pub fn unique() -> Self {
        Self {
            client: unique_user_id(),
            professional: unique_user_id(),
        }
    }
}

/// POST /conversations
#[derive(Debug, Serialize)]
pub struct OpenConversationRequest {
    pub professional_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

/// Conversation response
#[derive(Debug, Deserialize)]
pub struct ConversationResponse {
    pub id: String,
    pub client_id: String,
    pub professional_id: String,
    pub unread_count: i64,
}

/// POST /conversations/{id}/messages
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

/// Message response
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub kind: String,
    pub read_at: Option<String>,
}

/// POST /conversations/{id}/quotes
#[derive(Debug, Serialize)]
pub struct CreateQuoteRequest {
    pub title: String,
    pub price_centavos: i64,
}

/// POST /quotes/{id}/respond
#[derive(Debug, Serialize)]
pub struct RespondQuoteRequest {
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

/// Quote response
#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    pub id: String,
    pub conversation_id: String,
    pub title: String,
    pub price_centavos: i64,
    pub price_display: String,
    pub status: String,
    pub completed_at: Option<String>,
    pub client_confirmed: bool,
}

/// POST /identity
#[derive(Debug, Serialize)]
pub struct CollectIdentityRequest {
    pub document: String,
}

/// POST /conversations/{id}/typing
#[derive(Debug, Serialize)]
pub struct TypingRequest {
    pub display_name: String,
    pub is_typing: bool,
}

/// GET /conversations/{id}/typing entries
#[derive(Debug, Deserialize)]
pub struct TyperResponse {
    pub user_id: String,
    pub display_name: String,
}

/// GET /users/@me/unread
#[derive(Debug, Deserialize)]
pub struct UnreadCountResponse {
    pub total: i64,
}
