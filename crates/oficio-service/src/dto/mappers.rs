//! Entity → response mappers

use chrono::Utc;

use oficio_core::entities::{Appointment, Message, PaymentSession, Quote};
use oficio_core::traits::TypingSnapshot;

use crate::services::{ConversationSummary, PaymentInitiation, TimelineEntry, TimelineItem};

use super::responses::{
    AppointmentResponse, ConversationResponse, MessageResponse, PaymentInitiationResponse,
    PaymentSessionResponse, QuoteResponse, TimelineEntryResponse, TimelineItemResponse,
    TyperResponse,
};

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        let c = summary.conversation;
        Self {
            id: c.id,
            client_id: c.client_id,
            professional_id: c.professional_id,
            service_id: c.service_id,
            last_message_at: c.last_message_at,
            created_at: c.created_at,
            unread_count: summary.unread,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            content: m.content,
            kind: m.kind,
            file_url: m.file_url,
            file_name: m.file_name,
            reply_to_id: m.reply_to_id,
            created_at: m.created_at,
            read_at: m.read_at,
        }
    }
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            id: q.id,
            conversation_id: q.conversation_id,
            professional_id: q.professional_id,
            client_id: q.client_id,
            title: q.title,
            price_centavos: q.price.centavos(),
            price_display: q.price.to_string(),
            status: q.status,
            response_text: q.response_text,
            completed_at: q.completed_at,
            client_confirmed: q.client_confirmed,
            created_at: q.created_at,
            updated_at: q.updated_at,
        }
    }
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            quote_id: a.quote_id,
            scheduled_date: a.scheduled_date,
            scheduled_time: a.scheduled_time,
            location: a.location,
        }
    }
}

impl From<PaymentSession> for PaymentSessionResponse {
    fn from(s: PaymentSession) -> Self {
        let seconds_remaining = s.seconds_remaining_at(Utc::now());
        Self {
            pix_id: s.pix_id,
            quote_id: s.quote_id,
            br_code: s.br_code,
            br_code_base64: s.br_code_base64,
            amount_centavos: s.amount.centavos(),
            status: s.status,
            expires_at: s.expires_at,
            seconds_remaining,
        }
    }
}

impl From<PaymentInitiation> for PaymentInitiationResponse {
    fn from(outcome: PaymentInitiation) -> Self {
        match outcome {
            PaymentInitiation::IdentityRequired => Self::IdentityRequired,
            PaymentInitiation::Ready(session) => Self::Ready {
                session: session.into(),
            },
        }
    }
}

impl From<TimelineItem> for TimelineItemResponse {
    fn from(item: TimelineItem) -> Self {
        let entry = match item.entry {
            TimelineEntry::Message(m) => TimelineEntryResponse::Message { data: m.into() },
            TimelineEntry::Quote(q) => TimelineEntryResponse::Quote { data: q.into() },
        };
        Self {
            starts_new_day: item.starts_new_day,
            entry,
        }
    }
}

impl From<TypingSnapshot> for TyperResponse {
    fn from(t: TypingSnapshot) -> Self {
        Self {
            user_id: t.user_id,
            display_name: t.display_name,
        }
    }
}
