//! API integration tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Without that environment every test skips itself. The payment gateway is
//! NOT required: the end-to-end flow is exercised up to the identity gate,
//! and the PAID path runs against mocks in the service crate's own tests.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, check_test_env, fixtures::*, TestServer};
use reqwest::StatusCode;

/// Open a conversation between a fresh pair, returning (server-side id, pair)
async fn open_conversation(server: &TestServer, pair: ContactPair) -> String {
    let request = OpenConversationRequest {
        professional_id: pair.professional.to_string(),
        service_id: None,
    };
    let response = server
        .post_auth("/api/v1/conversations", &server.token_for(pair.client), &request)
        .await
        .unwrap();
    let conversation: ConversationResponse =
        assert_json(response, StatusCode::CREATED).await.unwrap();
    conversation.id
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth boundary
// ============================================================================

#[tokio::test]
async fn test_requests_require_bearer_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/v1/conversations").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Conversations
// ============================================================================

#[tokio::test]
async fn test_open_conversation_is_create_or_get() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();

    let first = open_conversation(&server, pair).await;

    let request = OpenConversationRequest {
        professional_id: pair.professional.to_string(),
        service_id: None,
    };
    let response = server
        .post_auth("/api/v1/conversations", &server.token_for(pair.client), &request)
        .await
        .unwrap();
    let second: ConversationResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(first, second.id);
}

#[tokio::test]
async fn test_outsiders_cannot_read_the_timeline() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    let outsider = unique_user_id();
    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/timeline"),
            &server.token_for(outsider),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Messages and read tracking
// ============================================================================

#[tokio::test]
async fn test_message_roundtrip_and_unread_badge() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    // Professional sends two messages
    for content in ["Bom dia!", "Posso passar amanhã para ver o serviço"] {
        let response = server
            .post_auth(
                &format!("/api/v1/conversations/{conversation_id}/messages"),
                &server.token_for(pair.professional),
                &SendMessageRequest {
                    content: content.to_string(),
                    reply_to_id: None,
                },
            )
            .await
            .unwrap();
        let _: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    }

    // Client sees an unread badge of 2
    let response = server
        .get_auth("/api/v1/users/@me/unread", &server.token_for(pair.client))
        .await
        .unwrap();
    let unread: UnreadCountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.total, 2);

    // Visiting the conversation marks everything read in one batch
    let response = server
        .post_auth_empty(
            &format!("/api/v1/conversations/{conversation_id}/read"),
            &server.token_for(pair.client),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth("/api/v1/users/@me/unread", &server.token_for(pair.client))
        .await
        .unwrap();
    let unread: UnreadCountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.total, 0);
}

#[tokio::test]
async fn test_clear_conversation_hides_history_for_caller_only() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &server.token_for(pair.professional),
            &SendMessageRequest {
                content: "mensagem antiga".to_string(),
                reply_to_id: None,
            },
        )
        .await
        .unwrap();
    let _: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    // Client clears the conversation
    let response = server
        .delete_auth(
            &format!("/api/v1/conversations/{conversation_id}"),
            &server.token_for(pair.client),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // Client's view is empty, the professional still sees the message
    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &server.token_for(pair.client),
        )
        .await
        .unwrap();
    let client_view: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(client_view.is_empty());

    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &server.token_for(pair.professional),
        )
        .await
        .unwrap();
    let professional_view: Vec<MessageResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(professional_view.len(), 1);
}

// ============================================================================
// Quote lifecycle
// ============================================================================

#[tokio::test]
async fn test_quote_lifecycle_up_to_the_identity_gate() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    // Professional sends the quote
    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/quotes"),
            &server.token_for(pair.professional),
            &CreateQuoteRequest {
                title: "Pintura de parede".to_string(),
                price_centavos: 25_000,
            },
        )
        .await
        .unwrap();
    let quote: QuoteResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(quote.status, "pending");
    assert_eq!(quote.price_display, "R$ 250,00");

    // Client accepts
    let response = server
        .post_auth(
            &format!("/api/v1/quotes/{}/respond", quote.id),
            &server.token_for(pair.client),
            &RespondQuoteRequest {
                decision: "accepted".to_string(),
                response_text: Some("pode começar".to_string()),
            },
        )
        .await
        .unwrap();
    let quote: QuoteResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(quote.status, "accepted");

    // Professional marks the service done; status stays accepted
    let response = server
        .post_auth_empty(
            &format!("/api/v1/quotes/{}/complete", quote.id),
            &server.token_for(pair.professional),
        )
        .await
        .unwrap();
    let quote: QuoteResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(quote.status, "accepted");
    assert!(quote.completed_at.is_some());
    assert!(!quote.client_confirmed);

    // Confirmation is payment-gated: with no identity document on file the
    // flow pauses instead of failing
    let response = server
        .post_auth_empty(
            &format!("/api/v1/quotes/{}/confirm", quote.id),
            &server.token_for(pair.client),
        )
        .await
        .unwrap();
    let outcome: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome["status"], "identity_required");

    // Collecting the document unblocks future initiation
    let response = server
        .post_auth(
            "/api/v1/identity",
            &server.token_for(pair.client),
            &CollectIdentityRequest {
                document: "123.456.789-09".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_answering_a_settled_quote_is_a_conflict() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/quotes"),
            &server.token_for(pair.professional),
            &CreateQuoteRequest {
                title: "Instalação de chuveiro".to_string(),
                price_centavos: 9_000,
            },
        )
        .await
        .unwrap();
    let quote: QuoteResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    // First answer settles the quote
    let response = server
        .post_auth(
            &format!("/api/v1/quotes/{}/respond", quote.id),
            &server.token_for(pair.client),
            &RespondQuoteRequest {
                decision: "rejected".to_string(),
                response_text: None,
            },
        )
        .await
        .unwrap();
    let quote_after: QuoteResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(quote_after.status, "rejected");

    // Second answer is rejected with no mutation
    let response = server
        .post_auth(
            &format!("/api/v1/quotes/{}/respond", quote.id),
            &server.token_for(pair.client),
            &RespondQuoteRequest {
                decision: "accepted".to_string(),
                response_text: None,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/quotes/{}", quote.id),
            &server.token_for(pair.client),
        )
        .await
        .unwrap();
    let unchanged: QuoteResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unchanged.status, "rejected");
}

#[tokio::test]
async fn test_only_the_professional_creates_quotes() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/quotes"),
            &server.token_for(pair.client),
            &CreateQuoteRequest {
                title: "Tentativa do cliente".to_string(),
                price_centavos: 100,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Timeline
// ============================================================================

#[tokio::test]
async fn test_timeline_interleaves_messages_and_quotes() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &server.token_for(pair.client),
            &SendMessageRequest {
                content: "quanto fica?".to_string(),
                reply_to_id: None,
            },
        )
        .await
        .unwrap();
    let _: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/quotes"),
            &server.token_for(pair.professional),
            &CreateQuoteRequest {
                title: "Pintura de parede".to_string(),
                price_centavos: 25_000,
            },
        )
        .await
        .unwrap();
    let _: QuoteResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/timeline"),
            &server.token_for(pair.client),
        )
        .await
        .unwrap();
    let timeline: Vec<serde_json::Value> = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0]["type"], "message");
    assert_eq!(timeline[1]["type"], "quote");
    assert_eq!(timeline[0]["starts_new_day"], true);
    assert_eq!(timeline[1]["starts_new_day"], false);
}

// ============================================================================
// Typing presence
// ============================================================================

#[tokio::test]
async fn test_typing_indicator_roundtrip() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let pair = ContactPair::unique();
    let conversation_id = open_conversation(&server, pair).await;

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/typing"),
            &server.token_for(pair.client),
            &TypingRequest {
                display_name: "Ana".to_string(),
                is_typing: true,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // The professional sees the client typing
    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/typing"),
            &server.token_for(pair.professional),
        )
        .await
        .unwrap();
    let typers: Vec<TyperResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(typers.len(), 1);
    assert_eq!(typers[0].display_name, "Ana");
    assert_eq!(typers[0].user_id, pair.client.to_string());

    // Explicit stop clears the indicator
    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/typing"),
            &server.token_for(pair.client),
            &TypingRequest {
                display_name: "Ana".to_string(),
                is_typing: false,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/typing"),
            &server.token_for(pair.professional),
        )
        .await
        .unwrap();
    let typers: Vec<TyperResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(typers.is_empty());
}
