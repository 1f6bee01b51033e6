mod domain_event;

pub use domain_event::{
    ConversationClearedEvent, ConversationCreatedEvent, DomainEvent, MessageCreatedEvent,
    MessageDeletedEvent, MessagesReadEvent, PaymentSessionCreatedEvent, QuoteConfirmedEvent,
    QuoteCreatedEvent, QuoteUpdatedEvent, TypingEvent,
};
