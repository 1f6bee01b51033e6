//! # oficio-cache
//!
//! Redis adapter for the realtime side of the conversation engine:
//!
//! - **Connection Pool**: managed Redis connection pool with deadpool
//! - **Pub/Sub**: the `EventPublisher` port over Redis channels, plus a
//!   subscriber for gateway processes and tests
//! - **Typing presence**: TTL-keyed typing indicators with a server-side
//!   refresh floor

pub mod pool;
pub mod presence;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolError, RedisResult};

// Re-export presence types
pub use presence::{TypingState, TypingStore};

// Re-export pubsub types
pub use pubsub::{
    parse_channel, InboundEvent, Publisher, Subscriber, SubscriberConfig, SubscriberError,
    SubscriberResult, CONVERSATION_CHANNEL_PREFIX, USER_CHANNEL_PREFIX,
};
