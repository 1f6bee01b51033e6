//! Redis Pub/Sub publisher.
//!
//! Implements the `EventPublisher` port: domain events are serialized with
//! their own tagged wire format and published on the conversation or user
//! channel.

use async_trait::async_trait;

use oficio_core::error::DomainError;
use oficio_core::events::DomainEvent;
use oficio_core::traits::{EventPublisher, RealtimeChannel};
use redis::AsyncCommands;

use crate::pool::{RedisPool, RedisResult};

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event, returning the number of receivers
    pub async fn publish_event(
        &self,
        channel: RealtimeChannel,
        event: &DomainEvent,
    ) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let payload = serde_json::to_string(event)?;

        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = %event.event_type(),
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }

}

#[async_trait]
impl EventPublisher for Publisher {
    async fn publish(
        &self,
        channel: RealtimeChannel,
        event: &DomainEvent,
    ) -> Result<(), DomainError> {
        self.publish_event(channel, event)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }
}
