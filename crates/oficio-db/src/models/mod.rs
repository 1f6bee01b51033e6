//! Database models - SQLx-compatible structs for PostgreSQL tables

mod appointment;
mod conversation;
mod message;
mod payment_session;
mod quote;

pub use appointment::AppointmentModel;
pub use conversation::ConversationModel;
pub use message::MessageModel;
pub use payment_session::PaymentSessionModel;
pub use quote::QuoteModel;
