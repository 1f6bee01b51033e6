//! Message entity <-> model mapper

use oficio_core::entities::{Message, MessageKind};
use oficio_core::error::DomainError;
use oficio_core::value_objects::Snowflake;

use crate::models::MessageModel;

use super::corrupt_row;

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let kind: MessageKind = model.kind.parse().map_err(corrupt_row)?;
        Ok(Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            sender_id: Snowflake::new(model.sender_id),
            content: model.content,
            kind,
            file_url: model.file_url,
            file_name: model.file_name,
            reply_to_id: model.reply_to_id.map(Snowflake::new),
            created_at: model.created_at,
            read_at: model.read_at,
        })
    }
}
