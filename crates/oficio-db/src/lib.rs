//! # oficio-db
//!
//! Database layer implementing the `oficio-core` ports with PostgreSQL via
//! SQLx:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Model ↔ entity mappers
//! - Repository implementations, including the conditional-update quote
//!   transitions
//! - The identity-gate storage backend

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool};
pub use repositories::{
    PgAppointmentRepository, PgConversationRepository, PgIdentityGate, PgMessageRepository,
    PgPaymentSessionRepository, PgQuoteRepository,
};
