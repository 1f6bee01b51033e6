//! Quote database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the quotes table
#[derive(Debug, Clone, FromRow)]
pub struct QuoteModel {
    pub id: i64,
    pub conversation_id: i64,
    pub professional_id: i64,
    pub client_id: i64,
    pub title: String,
    pub price_centavos: i64,
    pub status: String,
    pub response_text: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub client_confirmed: bool,
    pub pix_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
