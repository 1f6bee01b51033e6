//! Data transfer objects
//!
//! Request DTOs carry `validator` derives and are checked at the API edge;
//! response DTOs are built from entities via `From` impls in `mappers`.

mod mappers;
mod requests;
mod responses;

pub use requests::{
    CollectIdentityRequest, CreateQuoteRequest, OpenConversationRequest, RespondQuoteRequest,
    ScheduleAppointmentRequest, SendFileMessageRequest, SendMessageRequest, TypingRequest,
};
pub use responses::{
    AppointmentResponse, ConversationResponse, MessageResponse, PaymentInitiationResponse,
    PaymentSessionResponse, QuoteResponse, TimelineEntryResponse, TimelineItemResponse,
    TyperResponse, UnreadCountResponse,
};
