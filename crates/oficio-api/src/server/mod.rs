//! Server setup and initialization
//!
//! Wires the infrastructure adapters into the service context, builds the
//! Axum application, and runs the background sweeps (quote expiry, payment
//! reconciliation).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use oficio_cache::{Publisher, RedisPool, TypingStore};
use oficio_common::{AppConfig, AppError, TokenVerifier};
use oficio_core::SnowflakeGenerator;
use oficio_db::{
    create_pool, run_migrations, PgAppointmentRepository, PgConversationRepository, PgIdentityGate,
    PgMessageRepository, PgPaymentSessionRepository, PgQuoteRepository,
};
use oficio_pix::PixClient;
use oficio_service::{
    EngineSettings, PaymentCoordinator, QuoteService, ServiceContextBuilder,
};

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// How often the background sweeps run
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = apply_middleware(
        create_router(),
        &state.config().cors,
        state.config().app.env.is_production(),
    );
    // Probes bypass the middleware stack
    let router = router.merge(health_routes());
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Create Redis pool
    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::connect(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    // Token verification
    let verifier = TokenVerifier::new(&config.jwt.secret);

    // Id generation
    let generator = Arc::new(SnowflakeGenerator::new(config.node.node_id));

    // Collaborator adapters
    let gateway = Arc::new(PixClient::from_config(&config.payment)?);
    let publisher = Arc::new(Publisher::new(redis_pool.clone()));
    let typing = Arc::new(TypingStore::new(
        redis_pool.clone(),
        config.typing.ttl_secs,
        config.typing.refresh_floor_secs,
    ));

    // Engine timing from configuration
    let settings = EngineSettings {
        payment_poll_interval: Duration::from_secs(config.payment.poll_interval_secs),
        payment_reconcile_grace: chrono::Duration::seconds(config.payment.reconcile_grace_secs),
        quote_pending_ttl: chrono::Duration::days(config.quote.pending_ttl_days),
    };

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .quote_repo(Arc::new(PgQuoteRepository::new(pool.clone())))
        .appointment_repo(Arc::new(PgAppointmentRepository::new(pool.clone())))
        .session_repo(Arc::new(PgPaymentSessionRepository::new(pool.clone())))
        .identity_gate(Arc::new(PgIdentityGate::new(pool.clone())))
        .payment_gateway(gateway)
        .publisher(publisher)
        .typing(typing)
        .generator(generator)
        .settings(settings)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(
        service_context,
        verifier,
        config,
        pool,
        redis_pool,
    ))
}

/// Spawn the periodic sweeps: pending-quote expiry and payment
/// reconciliation for sessions whose watcher died mid-flight
pub fn spawn_background_sweeps(state: &AppState) {
    let ctx = state.service_context().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;

            if let Err(e) = QuoteService::new(&ctx).expire_stale_quotes().await {
                error!(error = %e, "Quote expiry sweep failed");
            }
            if let Err(e) = PaymentCoordinator::new(&ctx).reconcile_pending().await {
                error!(error = %e, "Payment reconciliation sweep failed");
            }
        }
    });
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));

    let state = create_app_state(config).await?;
    spawn_background_sweeps(&state);

    let app = create_app(state);

    run_server(app, addr).await
}
