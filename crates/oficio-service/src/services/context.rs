//! Service context - dependency container for services
//!
//! Holds the repository and collaborator ports plus the id generator and the
//! engine's timing knobs. Everything is behind `Arc`, so the context clones
//! cheaply into spawned tasks (payment watchers, background sweeps).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::AbortHandle;

use oficio_core::traits::{
    AppointmentRepository, ConversationRepository, EventPublisher, IdentityGate,
    MessageRepository, PaymentGateway, PaymentSessionRepository, QuoteRepository, TypingPresence,
};
use oficio_core::{Snowflake, SnowflakeGenerator};

/// Timing knobs for the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Gateway status poll interval while a payment view is open
    pub payment_poll_interval: Duration,
    /// Minimum age before reconciliation picks up a PENDING session
    pub payment_reconcile_grace: chrono::Duration,
    /// Age after which a pending quote is swept to `expired`
    pub quote_pending_ttl: chrono::Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            payment_poll_interval: Duration::from_secs(5),
            payment_reconcile_grace: chrono::Duration::seconds(120),
            quote_pending_ttl: chrono::Duration::days(7),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    quote_repo: Arc<dyn QuoteRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
    session_repo: Arc<dyn PaymentSessionRepository>,

    // Collaborators
    identity_gate: Arc<dyn IdentityGate>,
    payment_gateway: Arc<dyn PaymentGateway>,
    publisher: Arc<dyn EventPublisher>,
    typing: Arc<dyn TypingPresence>,

    // Id generation
    generator: Arc<SnowflakeGenerator>,

    // Engine timing
    settings: EngineSettings,

    // Live payment watchers, one slot per quote
    watchers: Arc<DashMap<Snowflake, AbortHandle>>,
}

impl ServiceContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        message_repo: Arc<dyn MessageRepository>,
        quote_repo: Arc<dyn QuoteRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
        session_repo: Arc<dyn PaymentSessionRepository>,
        identity_gate: Arc<dyn IdentityGate>,
        payment_gateway: Arc<dyn PaymentGateway>,
        publisher: Arc<dyn EventPublisher>,
        typing: Arc<dyn TypingPresence>,
        generator: Arc<SnowflakeGenerator>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
            quote_repo,
            appointment_repo,
            session_repo,
            identity_gate,
            payment_gateway,
            publisher,
            typing,
            generator,
            settings,
            watchers: Arc::new(DashMap::new()),
        }
    }

    // === Repositories ===

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn quote_repo(&self) -> &dyn QuoteRepository {
        self.quote_repo.as_ref()
    }

    pub fn appointment_repo(&self) -> &dyn AppointmentRepository {
        self.appointment_repo.as_ref()
    }

    pub fn session_repo(&self) -> &dyn PaymentSessionRepository {
        self.session_repo.as_ref()
    }

    // === Collaborators ===

    pub fn identity_gate(&self) -> &dyn IdentityGate {
        self.identity_gate.as_ref()
    }

    pub fn payment_gateway(&self) -> &dyn PaymentGateway {
        self.payment_gateway.as_ref()
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    pub fn typing(&self) -> &dyn TypingPresence {
        self.typing.as_ref()
    }

    // === Ids and settings ===

    pub fn generate_id(&self) -> Snowflake {
        self.generator.generate()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub(crate) fn watchers(&self) -> &DashMap<Snowflake, AbortHandle> {
        &self.watchers
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("settings", &self.settings)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    quote_repo: Option<Arc<dyn QuoteRepository>>,
    appointment_repo: Option<Arc<dyn AppointmentRepository>>,
    session_repo: Option<Arc<dyn PaymentSessionRepository>>,
    identity_gate: Option<Arc<dyn IdentityGate>>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    typing: Option<Arc<dyn TypingPresence>>,
    generator: Option<Arc<SnowflakeGenerator>>,
    settings: Option<EngineSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn quote_repo(mut self, repo: Arc<dyn QuoteRepository>) -> Self {
        self.quote_repo = Some(repo);
        self
    }

    pub fn appointment_repo(mut self, repo: Arc<dyn AppointmentRepository>) -> Self {
        self.appointment_repo = Some(repo);
        self
    }

    pub fn session_repo(mut self, repo: Arc<dyn PaymentSessionRepository>) -> Self {
        self.session_repo = Some(repo);
        self
    }

    pub fn identity_gate(mut self, gate: Arc<dyn IdentityGate>) -> Self {
        self.identity_gate = Some(gate);
        self
    }

    pub fn payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payment_gateway = Some(gateway);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn typing(mut self, typing: Arc<dyn TypingPresence>) -> Self {
        self.typing = Some(typing);
        self
    }

    pub fn generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext::new(
            self.conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            self.message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.quote_repo
                .ok_or_else(|| ServiceError::validation("quote_repo is required"))?,
            self.appointment_repo
                .ok_or_else(|| ServiceError::validation("appointment_repo is required"))?,
            self.session_repo
                .ok_or_else(|| ServiceError::validation("session_repo is required"))?,
            self.identity_gate
                .ok_or_else(|| ServiceError::validation("identity_gate is required"))?,
            self.payment_gateway
                .ok_or_else(|| ServiceError::validation("payment_gateway is required"))?,
            self.publisher
                .ok_or_else(|| ServiceError::validation("publisher is required"))?,
            self.typing
                .ok_or_else(|| ServiceError::validation("typing is required"))?,
            self.generator.unwrap_or_default(),
            self.settings.unwrap_or_default(),
        ))
    }
}
