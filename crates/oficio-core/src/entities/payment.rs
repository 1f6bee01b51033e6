//! PaymentSession entity - one PIX charge created for a quote

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Price, Snowflake};

/// Gateway-side charge status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// One charge created at the gateway for a quote. The invariant is at most
/// one *live* session per quote; expired and paid sessions are kept as
/// history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Gateway-issued charge reference
    pub pix_id: String,
    pub quote_id: Snowflake,
    /// Copy-paste PIX payload
    pub br_code: String,
    /// Rendered QR code, base64 PNG
    pub br_code_base64: String,
    pub amount: Price,
    pub status: PaymentStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PaymentSession {
    /// Past the gateway-declared deadline, regardless of stored status
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Still reusable: pending and inside the expiry window
    #[inline]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PaymentStatus::Pending && !self.is_expired_at(now)
    }

    /// Seconds left on the countdown shown next to the QR code
    pub fn seconds_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}
