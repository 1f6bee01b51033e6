//! In-memory implementations of every port, for service-level tests.
//!
//! The fakes honor the same contracts as the Postgres/Redis/HTTP adapters:
//! conditional writes are atomic (checked and applied under one lock), the
//! typing store throttles, the gateway hands out unique charge references.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use oficio_core::entities::{
    Appointment, Conversation, Message, PaymentSession, PaymentStatus, Quote, QuoteStatus,
};
use oficio_core::events::DomainEvent;
use oficio_core::traits::{
    AppointmentRepository, ConversationRepository, EventPublisher, IdentityGate, MessagePage,
    MessageRepository, PaymentGateway, PaymentSessionRepository, PixCharge, QuoteRepository,
    RealtimeChannel, RepoResult, TypingPresence, TypingSnapshot,
};
use oficio_core::value_objects::Price;
use oficio_core::{DomainError, Snowflake, SnowflakeGenerator};

use crate::services::{ConversationService, EngineSettings, ServiceContext, ServiceContextBuilder};

// ============================================================================
// Conversations
// ============================================================================

#[derive(Default)]
pub struct InMemoryConversationRepo {
    rows: Mutex<HashMap<Snowflake, Conversation>>,
    watermarks: Mutex<HashMap<(Snowflake, Snowflake), DateTime<Utc>>>,
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepo {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn find_by_key(
        &self,
        client_id: Snowflake,
        professional_id: Snowflake,
        service_id: Option<Snowflake>,
    ) -> RepoResult<Option<Conversation>> {
        Ok(self
            .rows
            .lock()
            .values()
            .find(|c| {
                c.client_id == client_id
                    && c.professional_id == professional_id
                    && c.service_id == service_id
            })
            .cloned())
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>> {
        let mut rows: Vec<Conversation> = self
            .rows
            .lock()
            .values()
            .filter(|c| c.is_participant(user_id))
            .cloned()
            .collect();
        rows.sort_by_key(|c| std::cmp::Reverse((c.last_message_at, c.id)));
        Ok(rows)
    }

    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let duplicate = rows.values().any(|c| {
            c.client_id == conversation.client_id
                && c.professional_id == conversation.professional_id
                && c.service_id == conversation.service_id
        });
        if duplicate {
            return Err(DomainError::ValidationError(
                "conversation already exists for this contact".to_string(),
            ));
        }
        rows.insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn touch_last_message(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        if let Some(conversation) = self.rows.lock().get_mut(&id) {
            let current = conversation.last_message_at.unwrap_or(DateTime::UNIX_EPOCH);
            conversation.last_message_at = Some(current.max(at));
        }
        Ok(())
    }

    async fn reset_last_message(&self, id: Snowflake, at: Option<DateTime<Utc>>) -> RepoResult<()> {
        if let Some(conversation) = self.rows.lock().get_mut(&id) {
            conversation.last_message_at = at;
        }
        Ok(())
    }

    async fn set_watermark(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut watermarks = self.watermarks.lock();
        let entry = watermarks.entry((conversation_id, user_id)).or_insert(at);
        *entry = (*entry).max(at);
        Ok(())
    }

    async fn watermark(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        Ok(self
            .watermarks
            .lock()
            .get(&(conversation_id, user_id))
            .copied())
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Default)]
pub struct InMemoryMessageRepo {
    rows: Mutex<Vec<Message>>,
    deleted: Mutex<HashSet<Snowflake>>,
    conversations: Mutex<HashMap<Snowflake, (Snowflake, Snowflake)>>,
    fail_next_create: AtomicBool,
}

impl InMemoryMessageRepo {
    /// Make the next `create` fail, to exercise failure sequencing
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Register a conversation's participants so unread queries can scope
    /// by membership the way the SQL join does
    pub fn register_conversation(&self, id: Snowflake, client: Snowflake, professional: Snowflake) {
        self.conversations.lock().insert(id, (client, professional));
    }

    fn visible(&self, message: &Message) -> bool {
        !self.deleted.lock().contains(&message.id)
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepo {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|m| m.id == id && self.visible(m))
            .cloned())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
        page: MessagePage,
    ) -> RepoResult<Vec<Message>> {
        let limit = page.limit.clamp(1, 100) as usize;
        let mut rows: Vec<Message> = self
            .rows
            .lock()
            .iter()
            .filter(|m| m.conversation_id == conversation_id && self.visible(m))
            .filter(|m| match (page.before, page.after) {
                (Some(before), _) => m.id < before,
                (_, Some(after)) => m.id > after,
                _ => true,
            })
            .cloned()
            .collect();

        if page.after.is_some() {
            rows.sort_by_key(|m| m.id);
            rows.truncate(limit);
        } else {
            rows.sort_by_key(|m| std::cmp::Reverse(m.id));
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn find_all(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        let mut rows: Vec<Message> = self
            .rows
            .lock()
            .iter()
            .filter(|m| m.conversation_id == conversation_id && self.visible(m))
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.created_at, m.id));
        Ok(rows)
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("injected failure".to_string()));
        }
        self.rows.lock().push(message.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let exists = self.rows.lock().iter().any(|m| m.id == id);
        if !exists || !self.deleted.lock().insert(id) {
            return Err(DomainError::MessageNotFound(id));
        }
        Ok(())
    }

    async fn latest_created_at(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|m| m.conversation_id == conversation_id && self.visible(m))
            .map(|m| m.created_at)
            .max())
    }

    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let deleted = self.deleted.lock().clone();
        let mut marked = 0;
        for message in self.rows.lock().iter_mut() {
            if message.conversation_id == conversation_id
                && message.sender_id != reader_id
                && message.read_at.is_none()
                && !deleted.contains(&message.id)
            {
                message.read_at = Some(at);
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn count_unread_total(&self, user_id: Snowflake) -> RepoResult<i64> {
        let conversations = self.conversations.lock().clone();
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|m| {
                conversations
                    .get(&m.conversation_id)
                    .is_some_and(|(c, p)| *c == user_id || *p == user_id)
                    && m.sender_id != user_id
                    && m.read_at.is_none()
                    && self.visible(m)
            })
            .count() as i64)
    }

    async fn count_unread_by_conversation(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<(Snowflake, i64)>> {
        let conversations = self.conversations.lock().clone();
        let mut counts: HashMap<Snowflake, i64> = HashMap::new();
        for message in self.rows.lock().iter() {
            let member = conversations
                .get(&message.conversation_id)
                .is_some_and(|(c, p)| *c == user_id || *p == user_id);
            if member
                && message.sender_id != user_id
                && message.read_at.is_none()
                && self.visible(message)
            {
                *counts.entry(message.conversation_id).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}

// ============================================================================
// Quotes
// ============================================================================

#[derive(Default)]
pub struct InMemoryQuoteRepo {
    rows: Mutex<HashMap<Snowflake, Quote>>,
}

impl InMemoryQuoteRepo {
    pub fn get(&self, id: Snowflake) -> Option<Quote> {
        self.rows.lock().get(&id).cloned()
    }

    /// Shift a quote's creation time into the past (expiry-sweep tests)
    pub fn backdate(&self, id: Snowflake, by: Duration) {
        if let Some(quote) = self.rows.lock().get_mut(&id) {
            quote.created_at -= by;
        }
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepo {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Quote>> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Quote>> {
        let mut rows: Vec<Quote> = self
            .rows
            .lock()
            .values()
            .filter(|q| q.conversation_id == conversation_id)
            .cloned()
            .collect();
        rows.sort_by_key(|q| (q.created_at, q.id));
        Ok(rows)
    }

    async fn create(&self, quote: &Quote) -> RepoResult<()> {
        self.rows.lock().insert(quote.id, quote.clone());
        Ok(())
    }

    async fn transition_status(
        &self,
        id: Snowflake,
        expected: QuoteStatus,
        next: QuoteStatus,
        response_text: Option<&str>,
    ) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(quote) if quote.status == expected => {
                quote.status = next;
                if let Some(text) = response_text {
                    quote.response_text = Some(text.to_string());
                }
                quote.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_completed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(quote) if quote.status == QuoteStatus::Accepted && quote.completed_at.is_none() => {
                quote.completed_at = Some(at);
                quote.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn attach_pix(&self, id: Snowflake, pix_id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(quote) if quote.is_awaiting_confirmation() => {
                quote.pix_id = Some(pix_id.to_string());
                quote.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn confirm_paid(&self, id: Snowflake, pix_id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(quote)
                if quote.is_awaiting_confirmation()
                    && quote.pix_id.as_deref() == Some(pix_id) =>
            {
                quote.client_confirmed = true;
                quote.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_stale_pending(&self, created_before: DateTime<Utc>) -> RepoResult<Vec<Quote>> {
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|q| q.status == QuoteStatus::Pending && q.created_at < created_before)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Appointments
// ============================================================================

#[derive(Default)]
pub struct InMemoryAppointmentRepo {
    rows: Mutex<HashMap<Snowflake, Appointment>>,
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepo {
    async fn find_by_quote(&self, quote_id: Snowflake) -> RepoResult<Option<Appointment>> {
        Ok(self.rows.lock().get(&quote_id).cloned())
    }

    async fn upsert(&self, appointment: &Appointment) -> RepoResult<()> {
        self.rows.lock().insert(appointment.quote_id, appointment.clone());
        Ok(())
    }
}

// ============================================================================
// Payment sessions
// ============================================================================

#[derive(Default)]
pub struct InMemorySessionRepo {
    rows: Mutex<HashMap<String, PaymentSession>>,
}

impl InMemorySessionRepo {
    /// Shift a session's creation time into the past (reconciliation tests)
    pub fn backdate(&self, pix_id: &str, by: Duration) {
        if let Some(session) = self.rows.lock().get_mut(pix_id) {
            session.created_at -= by;
        }
    }
}

#[async_trait]
impl PaymentSessionRepository for InMemorySessionRepo {
    async fn find_by_pix_id(&self, pix_id: &str) -> RepoResult<Option<PaymentSession>> {
        Ok(self.rows.lock().get(pix_id).cloned())
    }

    async fn find_live_by_quote(
        &self,
        quote_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<PaymentSession>> {
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|s| s.quote_id == quote_id && s.is_live_at(now))
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn create(&self, session: &PaymentSession) -> RepoResult<()> {
        self.rows.lock().insert(session.pix_id.clone(), session.clone());
        Ok(())
    }

    async fn settle(&self, pix_id: &str, status: PaymentStatus) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(pix_id) {
            Some(session) if session.status == PaymentStatus::Pending => {
                session.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_stale_pending(
        &self,
        created_before: DateTime<Utc>,
    ) -> RepoResult<Vec<PaymentSession>> {
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|s| s.status == PaymentStatus::Pending && s.created_at < created_before)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Identity gate
// ============================================================================

#[derive(Default)]
pub struct MockIdentityGate {
    on_file: Mutex<HashSet<Snowflake>>,
}

impl MockIdentityGate {
    pub fn put_on_file(&self, user_id: Snowflake) {
        self.on_file.lock().insert(user_id);
    }
}

#[async_trait]
impl IdentityGate for MockIdentityGate {
    async fn has_on_file_identity(&self, user_id: Snowflake) -> Result<bool, DomainError> {
        Ok(self.on_file.lock().contains(&user_id))
    }

    async fn collect_identity(
        &self,
        user_id: Snowflake,
        _document: &str,
    ) -> Result<(), DomainError> {
        self.on_file.lock().insert(user_id);
        Ok(())
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

pub struct MockGateway {
    counter: AtomicU64,
    statuses: Mutex<HashMap<String, PaymentStatus>>,
    charge_ttl: Mutex<Duration>,
    fail_next_status: AtomicBool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            counter: AtomicU64::new(0),
            statuses: Mutex::new(HashMap::new()),
            charge_ttl: Mutex::new(Duration::minutes(10)),
            fail_next_status: AtomicBool::new(false),
        }
    }
}

impl MockGateway {
    pub fn charges_created(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn set_status(&self, pix_id: &str, status: PaymentStatus) {
        self.statuses.lock().insert(pix_id.to_string(), status);
    }

    pub fn set_charge_ttl(&self, ttl: Duration) {
        *self.charge_ttl.lock() = ttl;
    }

    pub fn fail_next_status(&self) {
        self.fail_next_status.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_charge(
        &self,
        _amount: Price,
        reference: &str,
    ) -> Result<PixCharge, DomainError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let pix_id = format!("pix_{reference}_{n}");
        self.statuses
            .lock()
            .insert(pix_id.clone(), PaymentStatus::Pending);

        Ok(PixCharge {
            pix_id,
            br_code: format!("00020126BR{n}"),
            br_code_base64: "aVZCT1J3".to_string(),
            expires_at: Utc::now() + *self.charge_ttl.lock(),
        })
    }

    async fn get_status(&self, pix_id: &str) -> Result<PaymentStatus, DomainError> {
        if self.fail_next_status.swap(false, Ordering::SeqCst) {
            return Err(DomainError::GatewayError("gateway unreachable".to_string()));
        }
        self.statuses
            .lock()
            .get(pix_id)
            .copied()
            .ok_or_else(|| DomainError::GatewayError(format!("unknown charge {pix_id}")))
    }
}

// ============================================================================
// Event publisher
// ============================================================================

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(RealtimeChannel, DomainEvent)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<(RealtimeChannel, DomainEvent)> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|(_, e)| e.event_type()).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(
        &self,
        channel: RealtimeChannel,
        event: &DomainEvent,
    ) -> Result<(), DomainError> {
        self.events.lock().push((channel, event.clone()));
        Ok(())
    }
}

// ============================================================================
// Typing presence
// ============================================================================

const TYPING_FLOOR_SECS: u64 = 3;

#[derive(Default)]
pub struct InMemoryTyping {
    states: Mutex<HashMap<(Snowflake, Snowflake), (TypingSnapshot, Instant)>>,
}

#[async_trait]
impl TypingPresence for InMemoryTyping {
    async fn refresh(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        display_name: &str,
    ) -> Result<bool, DomainError> {
        let mut states = self.states.lock();
        let key = (conversation_id, user_id);
        if let Some((_, refreshed)) = states.get(&key) {
            if refreshed.elapsed().as_secs() < TYPING_FLOOR_SECS {
                return Ok(false);
            }
        }
        states.insert(
            key,
            (
                TypingSnapshot {
                    user_id,
                    display_name: display_name.to_string(),
                },
                Instant::now(),
            ),
        );
        Ok(true)
    }

    async fn stop(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<bool, DomainError> {
        Ok(self
            .states
            .lock()
            .remove(&(conversation_id, user_id))
            .is_some())
    }

    async fn active(&self, conversation_id: Snowflake) -> Result<Vec<TypingSnapshot>, DomainError> {
        Ok(self
            .states
            .lock()
            .iter()
            .filter(|((conv, _), _)| *conv == conversation_id)
            .map(|(_, (snapshot, _))| snapshot.clone())
            .collect())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Shared fixture: one client, one professional, all ports in memory
pub struct TestHarness {
    pub client: Snowflake,
    pub professional: Snowflake,
    pub conversations: Arc<InMemoryConversationRepo>,
    pub messages: Arc<InMemoryMessageRepo>,
    pub quotes: Arc<InMemoryQuoteRepo>,
    pub appointments: Arc<InMemoryAppointmentRepo>,
    pub sessions: Arc<InMemorySessionRepo>,
    pub identity: Arc<MockIdentityGate>,
    pub gateway: Arc<MockGateway>,
    pub publisher: Arc<RecordingPublisher>,
    ctx: ServiceContext,
}

impl TestHarness {
    pub fn new() -> Self {
        let conversations = Arc::new(InMemoryConversationRepo::default());
        let messages = Arc::new(InMemoryMessageRepo::default());
        let quotes = Arc::new(InMemoryQuoteRepo::default());
        let appointments = Arc::new(InMemoryAppointmentRepo::default());
        let sessions = Arc::new(InMemorySessionRepo::default());
        let identity = Arc::new(MockIdentityGate::default());
        let gateway = Arc::new(MockGateway::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let typing = Arc::new(InMemoryTyping::default());

        let ctx = ServiceContextBuilder::new()
            .conversation_repo(conversations.clone())
            .message_repo(messages.clone())
            .quote_repo(quotes.clone())
            .appointment_repo(appointments.clone())
            .session_repo(sessions.clone())
            .identity_gate(identity.clone())
            .payment_gateway(gateway.clone())
            .publisher(publisher.clone())
            .typing(typing)
            .generator(Arc::new(SnowflakeGenerator::new(1)))
            .settings(EngineSettings::default())
            .build()
            .expect("test context");

        Self {
            client: Snowflake::new(1_001),
            professional: Snowflake::new(2_002),
            conversations,
            messages,
            quotes,
            appointments,
            sessions,
            identity,
            gateway,
            publisher,
            ctx,
        }
    }

    pub fn with_identity_on_file(self) -> Self {
        self.identity.put_on_file(self.client);
        self
    }

    pub fn ctx(&self) -> &ServiceContext {
        &self.ctx
    }

    /// The default client/professional thread
    pub async fn conversation(&self) -> Conversation {
        self.conversation_for(None).await
    }

    /// A thread keyed to a specific service
    pub async fn conversation_for_service(&self, service_id: Snowflake) -> Conversation {
        self.conversation_for(Some(service_id)).await
    }

    async fn conversation_for(&self, service_id: Option<Snowflake>) -> Conversation {
        let conversation = ConversationService::new(&self.ctx)
            .open_conversation(self.client, self.professional, service_id)
            .await
            .expect("open conversation");
        self.messages
            .register_conversation(conversation.id, self.client, self.professional);
        conversation
    }
}
