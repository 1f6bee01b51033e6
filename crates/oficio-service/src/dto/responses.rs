//! Response DTOs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use oficio_core::entities::{MessageKind, PaymentStatus, QuoteStatus};
use oficio_core::Snowflake;

/// Conversation with the viewer's unread count
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: Snowflake,
    pub client_id: Snowflake,
    pub professional_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<Snowflake>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub unread_count: i64,
}

/// One chat message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// One quote
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub professional_id: Snowflake,
    pub client_id: Snowflake,
    pub title: String,
    pub price_centavos: i64,
    /// Human form, e.g. "R$ 250,00"
    pub price_display: String,
    pub status: QuoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub client_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled visit
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentResponse {
    pub id: Snowflake,
    pub quote_id: Snowflake,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
}

/// One payment session, with the countdown the payment view renders
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSessionResponse {
    pub pix_id: String,
    pub quote_id: Snowflake,
    pub br_code: String,
    pub br_code_base64: String,
    pub amount_centavos: i64,
    pub status: PaymentStatus,
    pub expires_at: DateTime<Utc>,
    pub seconds_remaining: i64,
}

/// Outcome of POST /quotes/:id/confirm
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentInitiationResponse {
    /// Collect the payer's document, then call again
    IdentityRequired,
    /// Charge is live; open the payment view
    Ready { session: PaymentSessionResponse },
}

/// One merged-feed entry
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineEntryResponse {
    Message { data: MessageResponse },
    Quote { data: QuoteResponse },
}

/// Feed entry plus its date-divider flag
#[derive(Debug, Clone, Serialize)]
pub struct TimelineItemResponse {
    pub starts_new_day: bool,
    #[serde(flatten)]
    pub entry: TimelineEntryResponse,
}

/// The badge total
#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub total: i64,
}

/// One participant currently typing
#[derive(Debug, Clone, Serialize)]
pub struct TyperResponse {
    pub user_id: Snowflake,
    pub display_name: String,
}
