//! Redis Pub/Sub - the realtime channel adapter

mod channels;
mod publisher;
mod subscriber;

pub use channels::{parse_channel, CONVERSATION_CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
pub use publisher::Publisher;
pub use subscriber::{
    InboundEvent, Subscriber, SubscriberConfig, SubscriberError, SubscriberResult,
};
