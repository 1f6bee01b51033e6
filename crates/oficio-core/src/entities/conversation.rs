//! Conversation entity - a client/professional contact thread

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Which side of the marketplace a participant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Client,
    Professional,
}

/// Conversation entity
///
/// Created lazily on first contact, keyed by
/// {client, professional, optional service}. Per-user visibility watermarks
/// ("clear conversation for me") live in their own store, not on the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub client_id: Snowflake,
    pub professional_id: Snowflake,
    pub service_id: Option<Snowflake>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        id: Snowflake,
        client_id: Snowflake,
        professional_id: Snowflake,
        service_id: Option<Snowflake>,
    ) -> Self {
        Self {
            id,
            client_id,
            professional_id,
            service_id,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    /// Check if a user takes part in this conversation
    #[inline]
    pub fn is_participant(&self, user_id: Snowflake) -> bool {
        user_id == self.client_id || user_id == self.professional_id
    }

    /// Role of a participant, `None` for outsiders
    pub fn role_of(&self, user_id: Snowflake) -> Option<ParticipantRole> {
        if user_id == self.client_id {
            Some(ParticipantRole::Client)
        } else if user_id == self.professional_id {
            Some(ParticipantRole::Professional)
        } else {
            None
        }
    }

    /// The participant on the other side of the thread
    pub fn counterpart_of(&self, user_id: Snowflake) -> Option<Snowflake> {
        match self.role_of(user_id)? {
            ParticipantRole::Client => Some(self.professional_id),
            ParticipantRole::Professional => Some(self.client_id),
        }
    }
}
