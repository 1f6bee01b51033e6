//! Conversation entity <-> model mapper

use oficio_core::entities::Conversation;
use oficio_core::value_objects::Snowflake;

use crate::models::ConversationModel;

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            client_id: Snowflake::new(model.client_id),
            professional_id: Snowflake::new(model.professional_id),
            service_id: model.service_id.map(Snowflake::new),
            last_message_at: model.last_message_at,
            created_at: model.created_at,
        }
    }
}
