//! # oficio-core
//!
//! Domain layer for the Oficio conversation engine: entities, value objects,
//! ports, and domain events. This crate has zero dependencies on
//! infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Appointment, Conversation, Message, MessageKind, PaymentSession, PaymentStatus, Quote,
    QuoteDecision, QuoteStatus,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    AppointmentRepository, ConversationRepository, EventPublisher, IdentityGate,
    MessagePage, MessageRepository, PaymentGateway, PaymentSessionRepository, PixCharge,
    QuoteRepository, RepoResult, RealtimeChannel, TypingPresence, TypingSnapshot,
};
pub use value_objects::{Price, PriceError, Snowflake, SnowflakeGenerator, SnowflakeParseError};
