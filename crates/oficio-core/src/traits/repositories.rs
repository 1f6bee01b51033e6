//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the infrastructure layer provides
//! the implementation. Methods that implement a guarded state transition
//! return `bool`: `true` when the conditional write landed, `false` when the
//! expected prior state no longer held (the caller decides between NotFound
//! and InvalidState by re-reading).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Appointment, Conversation, Message, PaymentSession, PaymentStatus, Quote, QuoteStatus};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Find the conversation for a {client, professional, service} key
    async fn find_by_key(
        &self,
        client_id: Snowflake,
        professional_id: Snowflake,
        service_id: Option<Snowflake>,
    ) -> RepoResult<Option<Conversation>>;

    /// List a user's conversations, most recently active first
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>>;

    /// Create a new conversation
    async fn create(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Advance `last_message_at` (never moves backwards)
    async fn touch_last_message(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Overwrite `last_message_at`, used when a deletion removed the latest
    /// message and the maximum has to be recomputed
    async fn reset_last_message(&self, id: Snowflake, at: Option<DateTime<Utc>>) -> RepoResult<()>;

    /// Set a user's clear-conversation watermark; messages before it are
    /// hidden for that user only
    async fn set_watermark(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Read a user's watermark, if any
    async fn watermark(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<DateTime<Utc>>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Cursor pagination for message history
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: i64,
}

impl Default for MessagePage {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            limit: 50,
        }
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Page through a conversation's messages
    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
        page: MessagePage,
    ) -> RepoResult<Vec<Message>>;

    /// All non-deleted messages of a conversation, ascending, for the
    /// timeline projection
    async fn find_all(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Create a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Soft delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Creation time of the newest non-deleted message, if any
    async fn latest_created_at(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Option<DateTime<Utc>>>;

    /// Stamp `read_at` on every unread message in the conversation that the
    /// reader did not send. Returns how many were marked.
    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<u64>;

    /// Unread messages addressed to this user, across all conversations
    async fn count_unread_total(&self, user_id: Snowflake) -> RepoResult<i64>;

    /// Unread counts per conversation for the conversation list
    async fn count_unread_by_conversation(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<(Snowflake, i64)>>;
}

// ============================================================================
// Quote Repository
// ============================================================================

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Find quote by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Quote>>;

    /// All quotes of a conversation, ascending by creation
    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Quote>>;

    /// Create a new quote
    async fn create(&self, quote: &Quote) -> RepoResult<()>;

    /// Guarded status transition: writes `next` (and the client's response
    /// text, when given) only where the row still holds `expected`.
    async fn transition_status(
        &self,
        id: Snowflake,
        expected: QuoteStatus,
        next: QuoteStatus,
        response_text: Option<&str>,
    ) -> RepoResult<bool>;

    /// Stamp `completed_at`, only while accepted and not yet completed
    async fn mark_completed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool>;

    /// Record the live charge reference, only while awaiting confirmation
    async fn attach_pix(&self, id: Snowflake, pix_id: &str) -> RepoResult<bool>;

    /// Flip `client_confirmed`, only while awaiting confirmation and only
    /// for the matching charge reference
    async fn confirm_paid(&self, id: Snowflake, pix_id: &str) -> RepoResult<bool>;

    /// Pending quotes created before the cutoff, for the expiry sweep
    async fn find_stale_pending(&self, created_before: DateTime<Utc>) -> RepoResult<Vec<Quote>>;
}

// ============================================================================
// Appointment Repository
// ============================================================================

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// The quote's appointment, if scheduled
    async fn find_by_quote(&self, quote_id: Snowflake) -> RepoResult<Option<Appointment>>;

    /// Create or replace the quote's appointment
    async fn upsert(&self, appointment: &Appointment) -> RepoResult<()>;
}

// ============================================================================
// Payment Session Repository
// ============================================================================

#[async_trait]
pub trait PaymentSessionRepository: Send + Sync {
    /// Find session by charge reference
    async fn find_by_pix_id(&self, pix_id: &str) -> RepoResult<Option<PaymentSession>>;

    /// The quote's live (pending, unexpired) session, if any
    async fn find_live_by_quote(
        &self,
        quote_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<PaymentSession>>;

    /// Persist a freshly created session
    async fn create(&self, session: &PaymentSession) -> RepoResult<()>;

    /// Move a session out of PENDING; false when it already settled
    async fn settle(&self, pix_id: &str, status: PaymentStatus) -> RepoResult<bool>;

    /// PENDING sessions older than the cutoff, for reconciliation
    async fn find_stale_pending(
        &self,
        created_before: DateTime<Utc>,
    ) -> RepoResult<Vec<PaymentSession>>;
}
