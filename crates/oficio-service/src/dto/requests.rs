//! Request DTOs

use serde::Deserialize;
use validator::Validate;

use oficio_core::entities::{MessageKind, QuoteDecision};
use oficio_core::Snowflake;

/// POST /conversations
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OpenConversationRequest {
    pub professional_id: Snowflake,
    pub service_id: Option<Snowflake>,
}

/// POST /conversations/:id/messages
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
    pub reply_to_id: Option<Snowflake>,
}

/// POST /conversations/:id/files
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendFileMessageRequest {
    pub kind: MessageKind,
    #[validate(url)]
    pub file_url: String,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(max = 4000))]
    pub caption: Option<String>,
}

/// POST /conversations/:id/quotes
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    #[validate(length(min = 1, max = 160))]
    pub title: String,
    #[validate(range(min = 1))]
    pub price_centavos: i64,
}

/// POST /quotes/:id/respond
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RespondQuoteRequest {
    pub decision: QuoteDecision,
    #[validate(length(max = 1000))]
    pub response_text: Option<String>,
}

/// POST /quotes/:id/appointment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleAppointmentRequest {
    pub scheduled_date: chrono::NaiveDate,
    pub scheduled_time: chrono::NaiveTime,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
}

/// POST /identity
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CollectIdentityRequest {
    #[validate(length(min = 11, max = 14))]
    pub document: String,
}

/// POST /conversations/:id/typing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TypingRequest {
    #[validate(length(min = 1, max = 60))]
    pub display_name: String,
    /// false means an explicit stop
    #[serde(default = "default_is_typing")]
    pub is_typing: bool,
}

fn default_is_typing() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_request_rejects_non_positive_price() {
        let request = CreateQuoteRequest {
            title: "Pintura".to_string(),
            price_centavos: 0,
        };
        assert!(request.validate().is_err());

        let request = CreateQuoteRequest {
            title: "Pintura".to_string(),
            price_centavos: 25_000,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn message_request_rejects_empty_content() {
        let request = SendMessageRequest {
            content: String::new(),
            reply_to_id: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn typing_defaults_to_started() {
        let request: TypingRequest =
            serde_json::from_str(r#"{"display_name":"Ana"}"#).unwrap();
        assert!(request.is_typing);
    }

    #[test]
    fn file_request_requires_a_url() {
        let request = SendFileMessageRequest {
            kind: MessageKind::Image,
            file_url: "not a url".to_string(),
            file_name: "wall.jpg".to_string(),
            caption: None,
        };
        assert!(request.validate().is_err());
    }
}
