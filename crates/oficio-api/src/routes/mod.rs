//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{appointments, conversations, health, messages, payments, quotes, typing};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health, which is
/// mounted separately so probes bypass the middleware stack)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(conversation_routes())
        .merge(quote_routes())
        .merge(user_routes())
}

/// Conversation-scoped routes
fn conversation_routes() -> Router<AppState> {
    Router::new()
        // Conversation lifecycle
        .route("/conversations", post(conversations::open_conversation))
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/:conversation_id",
            delete(conversations::clear_conversation),
        )
        // Merged feed
        .route(
            "/conversations/:conversation_id/timeline",
            get(conversations::get_timeline),
        )
        // Messages
        .route(
            "/conversations/:conversation_id/messages",
            get(messages::list_messages),
        )
        .route(
            "/conversations/:conversation_id/messages",
            post(messages::send_message),
        )
        .route(
            "/conversations/:conversation_id/files",
            post(messages::send_file_message),
        )
        .route("/messages/:message_id", delete(messages::delete_message))
        // Read tracking
        .route(
            "/conversations/:conversation_id/read",
            post(conversations::mark_read),
        )
        // Typing presence
        .route(
            "/conversations/:conversation_id/typing",
            post(typing::publish_typing),
        )
        .route(
            "/conversations/:conversation_id/typing",
            get(typing::get_typers),
        )
        // Quotes inside the conversation
        .route(
            "/conversations/:conversation_id/quotes",
            post(quotes::create_quote),
        )
        .route(
            "/conversations/:conversation_id/quotes",
            get(quotes::list_quotes),
        )
}

/// Quote-scoped routes
fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/quotes/:quote_id", get(quotes::get_quote))
        .route("/quotes/:quote_id/respond", post(quotes::respond_to_quote))
        .route("/quotes/:quote_id/cancel", post(quotes::cancel_quote))
        .route("/quotes/:quote_id/complete", post(quotes::complete_service))
        // Payment-gated confirmation
        .route("/quotes/:quote_id/confirm", post(payments::confirm_completion))
        .route("/quotes/:quote_id/payment", get(payments::payment_status))
        .route(
            "/quotes/:quote_id/payment",
            delete(payments::close_payment_view),
        )
        // Scheduled visit
        .route(
            "/quotes/:quote_id/appointment",
            post(appointments::schedule_visit),
        )
        .route(
            "/quotes/:quote_id/appointment",
            get(appointments::get_appointment),
        )
}

/// User-scoped routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me/unread", get(conversations::unread_total))
        .route("/identity", post(payments::collect_identity))
}
