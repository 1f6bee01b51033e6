//! Domain events - emitted when persisted state changes
//!
//! Persisted mutations emit these through the `EventPublisher` port; the
//! realtime side fans them out to conversation participants, and projections
//! (timeline, unread counts) recompute from the persisted set. Typing events
//! are the one exception: they are advisory and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::QuoteStatus;
use crate::value_objects::Snowflake;

/// All domain events carried over the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    ConversationCreated(ConversationCreatedEvent),
    ConversationCleared(ConversationClearedEvent),

    MessageCreated(MessageCreatedEvent),
    MessageDeleted(MessageDeletedEvent),
    MessagesRead(MessagesReadEvent),

    QuoteCreated(QuoteCreatedEvent),
    QuoteUpdated(QuoteUpdatedEvent),
    QuoteConfirmed(QuoteConfirmedEvent),

    PaymentSessionCreated(PaymentSessionCreatedEvent),

    TypingStarted(TypingEvent),
    TypingStopped(TypingEvent),
}

impl DomainEvent {
    /// Event type name as it appears on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ConversationCreated(_) => "CONVERSATION_CREATED",
            Self::ConversationCleared(_) => "CONVERSATION_CLEARED",
            Self::MessageCreated(_) => "MESSAGE_CREATED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
            Self::MessagesRead(_) => "MESSAGES_READ",
            Self::QuoteCreated(_) => "QUOTE_CREATED",
            Self::QuoteUpdated(_) => "QUOTE_UPDATED",
            Self::QuoteConfirmed(_) => "QUOTE_CONFIRMED",
            Self::PaymentSessionCreated(_) => "PAYMENT_SESSION_CREATED",
            Self::TypingStarted(_) => "TYPING_STARTED",
            Self::TypingStopped(_) => "TYPING_STOPPED",
        }
    }

    /// Conversation the event belongs to
    pub fn conversation_id(&self) -> Snowflake {
        match self {
            Self::ConversationCreated(e) => e.conversation_id,
            Self::ConversationCleared(e) => e.conversation_id,
            Self::MessageCreated(e) => e.conversation_id,
            Self::MessageDeleted(e) => e.conversation_id,
            Self::MessagesRead(e) => e.conversation_id,
            Self::QuoteCreated(e) => e.conversation_id,
            Self::QuoteUpdated(e) => e.conversation_id,
            Self::QuoteConfirmed(e) => e.conversation_id,
            Self::PaymentSessionCreated(e) => e.conversation_id,
            Self::TypingStarted(e) | Self::TypingStopped(e) => e.conversation_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ConversationCreated(e) => e.timestamp,
            Self::ConversationCleared(e) => e.timestamp,
            Self::MessageCreated(e) => e.timestamp,
            Self::MessageDeleted(e) => e.timestamp,
            Self::MessagesRead(e) => e.timestamp,
            Self::QuoteCreated(e) => e.timestamp,
            Self::QuoteUpdated(e) => e.timestamp,
            Self::QuoteConfirmed(e) => e.timestamp,
            Self::PaymentSessionCreated(e) => e.timestamp,
            Self::TypingStarted(e) | Self::TypingStopped(e) => e.timestamp,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationCreatedEvent {
    pub conversation_id: Snowflake,
    pub client_id: Snowflake,
    pub professional_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationClearedEvent {
    pub conversation_id: Snowflake,
    /// Only this user's view changed
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub conversation_id: Snowflake,
    pub message_id: Snowflake,
    pub sender_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedEvent {
    pub conversation_id: Snowflake,
    pub message_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesReadEvent {
    pub conversation_id: Snowflake,
    /// The reader, i.e. the counterpart of the messages' senders
    pub reader_id: Snowflake,
    pub marked: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteCreatedEvent {
    pub conversation_id: Snowflake,
    pub quote_id: Snowflake,
    pub professional_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteUpdatedEvent {
    pub conversation_id: Snowflake,
    pub quote_id: Snowflake,
    pub status: QuoteStatus,
    /// Set when the update was the professional marking the work done
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfirmedEvent {
    pub conversation_id: Snowflake,
    pub quote_id: Snowflake,
    pub pix_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSessionCreatedEvent {
    pub conversation_id: Snowflake,
    pub quote_id: Snowflake,
    pub pix_id: String,
    pub expires_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub display_name: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_tagged() {
        let event = DomainEvent::QuoteUpdated(QuoteUpdatedEvent {
            conversation_id: Snowflake::new(1),
            quote_id: Snowflake::new(2),
            status: QuoteStatus::Accepted,
            completed: false,
            timestamp: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"QUOTE_UPDATED\""));
        assert!(json.contains("\"accepted\""));

        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), "QUOTE_UPDATED");
        assert_eq!(back.conversation_id(), Snowflake::new(1));
    }

    #[test]
    fn event_type_names() {
        let event = DomainEvent::TypingStarted(TypingEvent {
            conversation_id: Snowflake::new(9),
            user_id: Snowflake::new(3),
            display_name: "Ana".to_string(),
            timestamp: Utc::now(),
        });
        assert_eq!(event.event_type(), "TYPING_STARTED");
        assert_eq!(event.conversation_id(), Snowflake::new(9));
    }
}
