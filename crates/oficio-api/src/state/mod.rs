//! Application state
//!
//! Shared state for the Axum application: the service context, the token
//! verifier, configuration, and the infrastructure pools the readiness
//! probe inspects.

use std::sync::Arc;

use oficio_cache::RedisPool;
use oficio_common::{AppConfig, TokenVerifier};
use oficio_db::PgPool;
use oficio_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    verifier: Arc<TokenVerifier>,
    config: Arc<AppConfig>,
    db_pool: PgPool,
    redis_pool: RedisPool,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        verifier: TokenVerifier,
        config: AppConfig,
        db_pool: PgPool,
        redis_pool: RedisPool,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            verifier: Arc::new(verifier),
            config: Arc::new(config),
            db_pool,
            redis_pool,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the token verifier
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the PostgreSQL pool (readiness probe)
    pub fn db_pool(&self) -> &PgPool {
        &self.db_pool
    }

    /// Get the Redis pool (readiness probe)
    pub fn redis_pool(&self) -> &RedisPool {
        &self.redis_pool
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .finish()
    }
}
