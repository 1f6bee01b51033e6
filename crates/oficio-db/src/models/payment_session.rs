//! PaymentSession database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the payment_sessions table
#[derive(Debug, Clone, FromRow)]
pub struct PaymentSessionModel {
    pub pix_id: String,
    pub quote_id: i64,
    pub br_code: String,
    pub br_code_base64: String,
    pub amount_centavos: i64,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
