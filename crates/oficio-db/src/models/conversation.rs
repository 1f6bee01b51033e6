//! Conversation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub client_id: i64,
    pub professional_id: i64,
    pub service_id: Option<i64>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
