//! Typing indicators in Redis.
//!
//! Contract: a typing key lives for `ttl_secs` and must be refreshed to stay
//! alive; key absence means "stopped typing". Refreshes arriving sooner than
//! `refresh_floor_secs` after the previous one are dropped, so clients may
//! publish per keystroke and the store still throttles. Nothing here is
//! persisted or part of any durability guarantee.

use async_trait::async_trait;
use oficio_core::error::DomainError;
use oficio_core::traits::{TypingPresence, TypingSnapshot};
use oficio_core::Snowflake;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};

/// Key prefix for typing indicators
const TYPING_PREFIX: &str = "typing:";

/// What a participant publishes while typing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingState {
    pub user_id: Snowflake,
    pub conversation_id: Snowflake,
    pub display_name: String,
    /// Last refresh, Unix seconds
    pub refreshed_at: i64,
}

impl TypingState {
    #[must_use]
    pub fn new(user_id: Snowflake, conversation_id: Snowflake, display_name: String) -> Self {
        Self {
            user_id,
            conversation_id,
            display_name,
            refreshed_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// TTL-keyed typing indicator store
#[derive(Clone)]
pub struct TypingStore {
    pool: RedisPool,
    ttl_secs: u64,
    refresh_floor_secs: u64,
}

impl TypingStore {
    #[must_use]
    pub fn new(pool: RedisPool, ttl_secs: u64, refresh_floor_secs: u64) -> Self {
        Self {
            pool,
            ttl_secs,
            refresh_floor_secs,
        }
    }

    fn key(conversation_id: Snowflake, user_id: Snowflake) -> String {
        format!("{TYPING_PREFIX}{conversation_id}:{user_id}")
    }

    /// Record that a user is typing.
    ///
    /// Returns `true` when the indicator was (re)armed, `false` when the
    /// refresh was dropped by the throttle - callers only broadcast on
    /// `true`.
    pub async fn set_typing(&self, state: &TypingState) -> RedisResult<bool> {
        let key = Self::key(state.conversation_id, state.user_id);

        // Remaining TTL above (ttl - floor) means the last refresh was less
        // than floor seconds ago.
        if let Some(remaining) = self.pool.ttl_remaining(&key).await? {
            let floor_cutoff = self.ttl_secs.saturating_sub(self.refresh_floor_secs) as i64;
            if remaining > floor_cutoff {
                return Ok(false);
            }
        }

        self.pool.put_ttl(&key, state, self.ttl_secs).await?;

        tracing::trace!(
            conversation_id = %state.conversation_id,
            user_id = %state.user_id,
            "Typing indicator armed"
        );

        Ok(true)
    }

    /// Explicitly clear a typing indicator (message sent, input blurred).
    /// Returns whether an indicator was present.
    pub async fn clear_typing(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RedisResult<bool> {
        self.pool.remove(&Self::key(conversation_id, user_id)).await
    }

    /// Everyone currently typing in a conversation
    pub async fn active_typers(&self, conversation_id: Snowflake) -> RedisResult<Vec<TypingState>> {
        let pattern = format!("{TYPING_PREFIX}{conversation_id}:*");
        let keys = self.pool.scan(&pattern).await?;

        let mut typers = Vec::with_capacity(keys.len());
        for key in keys {
            // Keys may expire between SCAN and GET; absence is fine
            if let Some(state) = self.pool.fetch::<TypingState>(&key).await? {
                typers.push(state);
            }
        }

        Ok(typers)
    }
}

#[async_trait]
impl TypingPresence for TypingStore {
    async fn refresh(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        display_name: &str,
    ) -> Result<bool, DomainError> {
        let state = TypingState::new(user_id, conversation_id, display_name.to_string());
        self.set_typing(&state)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }

    async fn stop(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<bool, DomainError> {
        self.clear_typing(conversation_id, user_id)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }

    async fn active(&self, conversation_id: Snowflake) -> Result<Vec<TypingSnapshot>, DomainError> {
        let typers = self
            .active_typers(conversation_id)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        Ok(typers
            .into_iter()
            .map(|t| TypingSnapshot {
                user_id: t.user_id,
                display_name: t.display_name,
            })
            .collect())
    }
}
