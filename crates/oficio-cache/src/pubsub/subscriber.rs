//! Redis Pub/Sub subscriber.
//!
//! The engine only publishes; this is the consuming side of the realtime
//! contract, used by gateway processes and tests. A background task owns the
//! Redis connection, re-subscribes after reconnects, and fans well-formed
//! events out over a broadcast channel. Payloads that fail to parse, or
//! arrive on channels outside the naming scheme, are logged and dropped -
//! the realtime stream is advisory and carries no durability guarantee.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::{broadcast, mpsc, RwLock};

use oficio_core::events::DomainEvent;
use oficio_core::traits::RealtimeChannel;

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Subscriber task is gone")]
    TaskGone,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// One event received over the realtime channel
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub channel: RealtimeChannel,
    pub event: DomainEvent,
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub redis_url: String,
    /// Broadcast buffer; slow receivers see `Lagged`, never block the reader
    pub buffer: usize,
    /// Delay before re-dialing after a dropped connection
    pub reconnect_delay: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            buffer: 1024,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

enum Control {
    Add(String),
    Remove(String),
    Stop,
}

/// Redis Pub/Sub subscriber
pub struct Subscriber {
    channels: Arc<RwLock<HashSet<String>>>,
    events_tx: broadcast::Sender<InboundEvent>,
    control_tx: mpsc::Sender<Control>,
}

impl Subscriber {
    /// Start the background reader task
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.buffer);
        let (control_tx, control_rx) = mpsc::channel(32);
        let channels = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(reader_task(
            config,
            channels.clone(),
            events_tx.clone(),
            control_rx,
        ));

        Self {
            channels,
            events_tx,
            control_tx,
        }
    }

    /// Start listening on a channel
    pub async fn subscribe(&self, channel: RealtimeChannel) -> SubscriberResult<()> {
        self.control_tx
            .send(Control::Add(channel.name()))
            .await
            .map_err(|_| SubscriberError::TaskGone)
    }

    /// Stop listening on a channel
    pub async fn unsubscribe(&self, channel: RealtimeChannel) -> SubscriberResult<()> {
        self.control_tx
            .send(Control::Remove(channel.name()))
            .await
            .map_err(|_| SubscriberError::TaskGone)
    }

    /// A new receiver over the event stream
    pub fn events(&self) -> broadcast::Receiver<InboundEvent> {
        self.events_tx.subscribe()
    }

    /// Channel names currently subscribed
    pub async fn subscribed(&self) -> Vec<String> {
        self.channels.read().await.iter().cloned().collect()
    }

    /// Stop the background task
    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.control_tx
            .send(Control::Stop)
            .await
            .map_err(|_| SubscriberError::TaskGone)
    }
}

/// Outer loop: dial, run, and re-dial after failures until told to stop
async fn reader_task(
    config: SubscriberConfig,
    channels: Arc<RwLock<HashSet<String>>>,
    events_tx: broadcast::Sender<InboundEvent>,
    mut control_rx: mpsc::Receiver<Control>,
) {
    loop {
        match read_until_failure(&config, &channels, &events_tx, &mut control_rx).await {
            Ok(()) => {
                tracing::info!("Subscriber shut down");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscriber connection lost, reconnecting");
                tokio::time::sleep(config.reconnect_delay).await;
            }
        }
    }
}

/// One connection's lifetime. `Ok` means a clean shutdown was requested.
async fn read_until_failure(
    config: &SubscriberConfig,
    channels: &Arc<RwLock<HashSet<String>>>,
    events_tx: &broadcast::Sender<InboundEvent>,
    control_rx: &mut mpsc::Receiver<Control>,
) -> SubscriberResult<()> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;

    // Carry existing subscriptions across the reconnect
    for name in channels.read().await.iter() {
        pubsub.subscribe(name).await?;
    }

    tracing::info!("Subscriber connected to Redis");

    let mut stream = pubsub.on_message();
    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(msg) = msg else {
                    tracing::warn!("Pub/Sub stream ended");
                    return Err(SubscriberError::Redis(redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "pub/sub stream closed",
                    ))));
                };
                let name = msg.get_channel_name();
                let payload: String = msg.get_payload().unwrap_or_default();
                match decode(name, &payload) {
                    Some(inbound) => {
                        // Send errors only mean nobody is listening right now
                        let _ = events_tx.send(inbound);
                    }
                    None => {
                        tracing::warn!(channel = %name, "Dropped malformed realtime message");
                    }
                }
            }

            cmd = control_rx.recv() => {
                // The message stream borrows the connection; release it
                // before touching subscriptions.
                drop(stream);
                match cmd {
                    Some(Control::Add(name)) => {
                        pubsub.subscribe(&name).await?;
                        channels.write().await.insert(name);
                    }
                    Some(Control::Remove(name)) => {
                        pubsub.unsubscribe(&name).await?;
                        channels.write().await.remove(&name);
                    }
                    Some(Control::Stop) | None => return Ok(()),
                }
                stream = pubsub.on_message();
            }
        }
    }
}

fn decode(channel_name: &str, payload: &str) -> Option<InboundEvent> {
    let channel = super::parse_channel(channel_name)?;
    let event: DomainEvent = serde_json::from_str(payload).ok()?;
    Some(InboundEvent { channel, event })
}
