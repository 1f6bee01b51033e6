//! Repository implementations
//!
//! PostgreSQL implementations of the ports defined in oficio-core. Each
//! repository handles database operations for a specific aggregate; the
//! quote repository carries the compare-and-set transition queries.

mod appointment;
mod conversation;
mod error;
mod identity;
mod message;
mod payment_session;
mod quote;

pub use appointment::PgAppointmentRepository;
pub use conversation::PgConversationRepository;
pub use identity::PgIdentityGate;
pub use message::PgMessageRepository;
pub use payment_session::PgPaymentSessionRepository;
pub use quote::PgQuoteRepository;
