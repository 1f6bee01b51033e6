//! Ports - interfaces the domain needs, implemented by infrastructure

mod collaborators;
mod repositories;

pub use collaborators::{
    EventPublisher, IdentityGate, PaymentGateway, PixCharge, RealtimeChannel, TypingPresence,
    TypingSnapshot,
};
pub use repositories::{
    AppointmentRepository, ConversationRepository, MessagePage, MessageRepository,
    PaymentSessionRepository, QuoteRepository, RepoResult,
};
