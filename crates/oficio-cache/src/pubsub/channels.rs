//! Channel naming for Redis Pub/Sub
//!
//! The name format is owned by `RealtimeChannel::name()` in oficio-core;
//! this module only adds the reverse mapping the subscriber needs.

use oficio_core::traits::RealtimeChannel;
use oficio_core::Snowflake;

/// Channel prefix for conversation events
pub const CONVERSATION_CHANNEL_PREFIX: &str = "conversation:";
/// Channel prefix for user-directed events
pub const USER_CHANNEL_PREFIX: &str = "user:";

/// Parse a Redis channel name back into a [`RealtimeChannel`]
#[must_use]
pub fn parse_channel(name: &str) -> Option<RealtimeChannel> {
    if let Some(id) = name.strip_prefix(CONVERSATION_CHANNEL_PREFIX) {
        return id.parse::<i64>().ok().map(|id| RealtimeChannel::Conversation(Snowflake::new(id)));
    }
    if let Some(id) = name.strip_prefix(USER_CHANNEL_PREFIX) {
        return id.parse::<i64>().ok().map(|id| RealtimeChannel::User(Snowflake::new(id)));
    }
    None
}
