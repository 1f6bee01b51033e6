//! # oficio-service
//!
//! Application layer of the conversation engine: conversations, messages,
//! the quote state machine, payment coordination, the merged timeline, read
//! tracking, and typing presence. Services hold no state of their own; they
//! borrow the [`services::ServiceContext`] dependency container and talk to
//! the outside world through the oficio-core ports.

pub mod dto;
pub mod services;

pub use services::{
    AppointmentService, ConversationService, EngineSettings, MessageService, PaymentCoordinator,
    PaymentInitiation, PresenceService, QuoteService, ReadTracker, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, TimelineService,
};

#[cfg(test)]
pub(crate) mod testing;
