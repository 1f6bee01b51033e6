//! Collaborator ports - external services the engine coordinates with
//!
//! The payment gateway, the identity gate, and the realtime channel are
//! consumed through these narrow interfaces; adapters live in their own
//! infrastructure crates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::PaymentStatus;
use crate::error::DomainError;
use crate::events::DomainEvent;
use crate::value_objects::{Price, Snowflake};

// ============================================================================
// Payment Gateway
// ============================================================================

/// A charge as returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixCharge {
    pub pix_id: String,
    pub br_code: String,
    pub br_code_base64: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a charge for `amount`; `reference` ties it back to the quote
    async fn create_charge(&self, amount: Price, reference: &str) -> Result<PixCharge, DomainError>;

    /// Current status of a charge
    async fn get_status(&self, pix_id: &str) -> Result<PaymentStatus, DomainError>;
}

// ============================================================================
// Identity Gate
// ============================================================================

/// Checks and collects the payer's identity document (CPF). Payment cannot
/// start without one on file.
#[async_trait]
pub trait IdentityGate: Send + Sync {
    async fn has_on_file_identity(&self, user_id: Snowflake) -> Result<bool, DomainError>;

    async fn collect_identity(&self, user_id: Snowflake, document: &str)
        -> Result<(), DomainError>;
}

// ============================================================================
// Realtime Channel
// ============================================================================

/// Addressing for realtime fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeChannel {
    /// Both participants of a conversation
    Conversation(Snowflake),
    /// One user, across all their conversations
    User(Snowflake),
}

impl RealtimeChannel {
    /// Transport-level channel name
    pub fn name(&self) -> String {
        match self {
            Self::Conversation(id) => format!("conversation:{id}"),
            Self::User(id) => format!("user:{id}"),
        }
    }
}

/// Publish side of the realtime channel. Failures here are logged and
/// swallowed by callers; delivery is best-effort and never gates a mutation.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        channel: RealtimeChannel,
        event: &DomainEvent,
    ) -> Result<(), DomainError>;
}

// ============================================================================
// Typing Presence
// ============================================================================

/// Snapshot of one participant's typing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSnapshot {
    pub user_id: Snowflake,
    pub display_name: String,
}

/// Ephemeral typing-indicator channel. Contract: an indicator survives for a
/// fixed TTL after the last accepted refresh; refreshes faster than the
/// store's floor are dropped (`refresh` returns false). Nothing is persisted.
#[async_trait]
pub trait TypingPresence: Send + Sync {
    /// Arm or refresh the caller's indicator; false when throttled
    async fn refresh(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        display_name: &str,
    ) -> Result<bool, DomainError>;

    /// Clear the caller's indicator; returns whether one was present
    async fn stop(&self, conversation_id: Snowflake, user_id: Snowflake)
        -> Result<bool, DomainError>;

    /// Everyone currently typing in the conversation
    async fn active(&self, conversation_id: Snowflake) -> Result<Vec<TypingSnapshot>, DomainError>;
}
