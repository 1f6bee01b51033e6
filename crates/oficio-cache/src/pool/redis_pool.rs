//! Deadpool-backed Redis connections.
//!
//! One pool serves three consumers: the pub/sub publisher (raw connections),
//! the typing store (JSON values with TTLs), and the readiness probe.

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

/// Failures talking to Redis
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Redis pool unavailable: {0}")]
    Pool(String),

    #[error("Redis command error: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Stored value is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<deadpool_redis::PoolError> for RedisPoolError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        Self::Pool(e.to_string())
    }
}

/// Result type for Redis pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Open a pool against the configured Redis instance
    pub fn connect(config: &oficio_common::RedisConfig) -> RedisResult<Self> {
        let pool = Config::from_url(config.url.as_str())
            .builder()
            .map_err(|e| RedisPoolError::Pool(e.to_string()))?
            .max_size(config.max_connections as usize)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Pool(e.to_string()))?;

        // Credentials, if any, sit before the '@' and stay out of the logs
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    /// Check out a raw connection
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// PING, for the readiness probe
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Store a JSON value under a key that expires after `ttl_secs`
    pub async fn put_ttl<V: serde::Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_secs: u64,
    ) -> RedisResult<()> {
        let mut conn = self.get().await?;
        let json = serde_json::to_string(value)?;
        conn.set_ex::<_, _, ()>(key, &json, ttl_secs).await?;
        Ok(())
    }

    /// Read a JSON value back; `None` when the key is absent or expired
    pub async fn fetch<V: serde::de::DeserializeOwned>(&self, key: &str) -> RedisResult<Option<V>> {
        let mut conn = self.get().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }

    /// Drop a key; `true` when one existed
    pub async fn remove(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        let removed: i32 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Remaining TTL in seconds; `None` when the key does not exist.
    /// Keys without an expiry report -1, per Redis.
    pub async fn ttl_remaining(&self, key: &str) -> RedisResult<Option<i64>> {
        let mut conn = self.get().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(if ttl == -2 { None } else { Some(ttl) })
    }

    /// All keys matching a glob pattern, via cursored SCAN so Redis is
    /// never blocked the way KEYS would
    pub async fn scan(&self, pattern: &str) -> RedisResult<Vec<String>> {
        let mut conn = self.get().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(32)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}
