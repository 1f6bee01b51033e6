//! Domain entities - core business objects

mod appointment;
mod conversation;
mod message;
mod payment;
mod quote;

pub use appointment::Appointment;
pub use conversation::{Conversation, ParticipantRole};
pub use message::{Message, MessageKind};
pub use payment::{PaymentSession, PaymentStatus};
pub use quote::{Quote, QuoteDecision, QuoteStatus};
