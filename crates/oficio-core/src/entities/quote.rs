//! Quote entity - a price proposal and its approval state machine
//!
//! Status graph:
//!
//! ```text
//! pending ──> accepted ──> accepted + completed_at ──> confirmed (paid)
//!    │            │
//!    │            └──> cancelled
//!    ├──> rejected
//!    ├──> cancelled
//!    └──> expired
//! ```
//!
//! "confirmed" is not a status of its own: it is `accepted` with
//! `completed_at` set and `client_confirmed = true`, reached only through the
//! payment flow. rejected, cancelled, expired, and confirmed are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Price, Snowflake};

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Statuses that admit no further status change
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Expired)
    }

    /// The declared transition graph. Everything else is rejected before any
    /// mutation happens.
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Accepted | Self::Rejected | Self::Cancelled | Self::Expired
            ) | (Self::Accepted, Self::Cancelled)
        )
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown quote status: {other}")),
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's answer to a pending quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteDecision {
    Accepted,
    Rejected,
}

impl QuoteDecision {
    pub fn as_status(self) -> QuoteStatus {
        match self {
            Self::Accepted => QuoteStatus::Accepted,
            Self::Rejected => QuoteStatus::Rejected,
        }
    }
}

/// Quote entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub professional_id: Snowflake,
    pub client_id: Snowflake,
    pub title: String,
    pub price: Price,
    pub status: QuoteStatus,
    pub response_text: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub client_confirmed: bool,
    pub pix_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// New quote, starts in `pending`
    pub fn new(
        id: Snowflake,
        conversation_id: Snowflake,
        professional_id: Snowflake,
        client_id: Snowflake,
        title: String,
        price: Price,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            conversation_id,
            professional_id,
            client_id,
            title,
            price,
            status: QuoteStatus::Pending,
            response_text: None,
            completed_at: None,
            client_confirmed: false,
            pix_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Terminal means no further transition of any kind: a dead status, or
    /// the paid-and-confirmed end state.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal() || self.client_confirmed
    }

    /// Service done, payment not yet confirmed
    #[inline]
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.status == QuoteStatus::Accepted && self.completed_at.is_some() && !self.client_confirmed
    }

    /// The confirmed terminal state
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.client_confirmed
    }

    /// Cancellation window: pending or accepted, and not yet confirmed
    #[inline]
    pub fn can_cancel(&self) -> bool {
        matches!(self.status, QuoteStatus::Pending | QuoteStatus::Accepted)
            && !self.client_confirmed
    }

    /// Completion requires an accepted, not-yet-completed quote
    #[inline]
    pub fn can_complete(&self) -> bool {
        self.status == QuoteStatus::Accepted && self.completed_at.is_none()
    }
}
