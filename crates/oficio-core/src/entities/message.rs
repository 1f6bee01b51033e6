//! Message entity - one chat message inside a conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// What a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
        }
    }

    /// Non-text messages must carry a file reference
    #[inline]
    pub fn requires_file(self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl std::str::FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            other => Err(format!("unknown message kind: {other}")),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub kind: MessageKind,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// Weak self-reference: the target may be hidden or deleted independently
    pub reply_to_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a plain text message
    pub fn new_text(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        reply_to_id: Option<Snowflake>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            kind: MessageKind::Text,
            file_url: None,
            file_name: None,
            reply_to_id,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    /// Create an image or file message
    pub fn new_file(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        kind: MessageKind,
        file_url: String,
        file_name: String,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content: String::new(),
            kind,
            file_url: Some(file_url),
            file_name: Some(file_name),
            reply_to_id: None,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    #[inline]
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to_id.is_some()
    }

    /// Truncated content for conversation-list previews
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }
}
