//! Domain errors - error types for the domain layer
//!
//! State-machine violations are rejected before any mutation; an
//! `InvalidState` error always means nothing was written.

use thiserror::Error;

use crate::entities::QuoteStatus;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Quote not found: {0}")]
    QuoteNotFound(Snowflake),

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Price must be positive")]
    NonPositivePrice,

    #[error("Reply target {reply_to} is not in conversation {conversation}")]
    ReplyOutsideConversation {
        reply_to: Snowflake,
        conversation: Snowflake,
    },

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Permission (wrong role for a transition)
    // =========================================================================
    #[error("Not a participant of this conversation")]
    NotParticipant,

    #[error("Only the professional may perform this action")]
    ProfessionalOnly,

    #[error("Only the client may perform this action")]
    ClientOnly,

    #[error("Only the sender may modify this message")]
    SenderOnly,

    // =========================================================================
    // Invalid State (transition illegal from current status)
    // =========================================================================
    #[error("Quote {id} cannot move from {current} to {requested}")]
    InvalidTransition {
        id: Snowflake,
        current: QuoteStatus,
        requested: QuoteStatus,
    },

    #[error("Quote {0} is not awaiting completion")]
    NotCompletable(Snowflake),

    #[error("Quote {0} is not awaiting confirmation")]
    NotConfirmable(Snowflake),

    #[error("Quote {0} was modified concurrently")]
    ConcurrentUpdate(Snowflake),

    #[error("Quote {0} must be accepted before scheduling a visit")]
    NotSchedulable(Snowflake),

    // =========================================================================
    // External Service
    // =========================================================================
    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    // =========================================================================
    // Infrastructure (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::QuoteNotFound(_) => "UNKNOWN_QUOTE",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NonPositivePrice => "NON_POSITIVE_PRICE",
            Self::ReplyOutsideConversation { .. } => "REPLY_OUTSIDE_CONVERSATION",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::ProfessionalOnly => "PROFESSIONAL_ONLY",
            Self::ClientOnly => "CLIENT_ONLY",
            Self::SenderOnly => "SENDER_ONLY",

            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotCompletable(_) => "NOT_COMPLETABLE",
            Self::NotConfirmable(_) => "NOT_CONFIRMABLE",
            Self::ConcurrentUpdate(_) => "CONCURRENT_UPDATE",
            Self::NotSchedulable(_) => "NOT_SCHEDULABLE",

            Self::GatewayError(_) => "GATEWAY_ERROR",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ConversationNotFound(_) | Self::MessageNotFound(_) | Self::QuoteNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::NonPositivePrice
                | Self::ReplyOutsideConversation { .. }
                | Self::ContentTooLong { .. }
        )
    }

    /// Check if this is a permission error (wrong role for the action)
    pub fn is_permission(&self) -> bool {
        matches!(
            self,
            Self::NotParticipant | Self::ProfessionalOnly | Self::ClientOnly | Self::SenderOnly
        )
    }

    /// Check if this is an invalid-state error (illegal transition)
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::NotCompletable(_)
                | Self::NotConfirmable(_)
                | Self::ConcurrentUpdate(_)
                | Self::NotSchedulable(_)
        )
    }

    /// Check if this is an external-service error
    pub fn is_external(&self) -> bool {
        matches!(self, Self::GatewayError(_))
    }
}
