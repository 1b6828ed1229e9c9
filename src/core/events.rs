//! Checkout lifecycle events
//!
//! The [`EventBus`] lets presentation code (a spinner, an analytics hook, the
//! screen that disables the "Donate" button) follow a checkout without being
//! wired into it. It uses `tokio::sync::broadcast`, so any number of
//! subscribers can listen and publishing never blocks.
//!
//! ```text
//! CheckoutSession::submit() ──▶ EventBus::publish() ──▶ broadcast channel ──▶ subscribers
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(64);
//! let mut rx = bus.subscribe();
//!
//! let session = CheckoutSession::new(donation, processor).with_events(bus.clone());
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{} for session {}", envelope.event.action(), envelope.event.session_id());
//! }
//! ```

use super::payment::FailureReason;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

/// Something that happened to a checkout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowEvent {
    /// A finalized donation was handed to a checkout session
    CheckoutOpened {
        session_id: Uuid,
        donation_amount: Decimal,
        processing_fee: Decimal,
        total_charge: Decimal,
    },
    /// Validation passed and the charge is being processed
    SubmissionStarted { session_id: Uuid },
    /// The charge resolved
    SubmissionResolved {
        session_id: Uuid,
        transaction_id: Option<String>,
        failure: Option<FailureReason>,
    },
    /// An outcome arrived after the session was cancelled and was dropped
    SubmissionDiscarded { session_id: Uuid },
    /// The donor navigated away
    SessionCancelled { session_id: Uuid },
}

impl FlowEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            FlowEvent::CheckoutOpened { session_id, .. }
            | FlowEvent::SubmissionStarted { session_id }
            | FlowEvent::SubmissionResolved { session_id, .. }
            | FlowEvent::SubmissionDiscarded { session_id }
            | FlowEvent::SessionCancelled { session_id } => *session_id,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            FlowEvent::CheckoutOpened { .. } => "checkout_opened",
            FlowEvent::SubmissionStarted { .. } => "submission_started",
            FlowEvent::SubmissionResolved { .. } => "submission_resolved",
            FlowEvent::SubmissionDiscarded { .. } => "submission_discarded",
            FlowEvent::SessionCancelled { .. } => "session_cancelled",
        }
    }
}

/// Envelope wrapping a flow event with metadata
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: FlowEvent,
}

impl EventEnvelope {
    pub fn new(event: FlowEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of receivers that will get the event; zero when
    /// nobody is listening.
    pub fn publish(&self, event: FlowEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Receive all future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Future events as a stream, skipping over any a slow reader missed
    pub fn stream(&self) -> impl Stream<Item = EventEnvelope> + use<> {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| match item {
            Ok(envelope) => Some(envelope),
            Err(lagged) => {
                tracing::warn!(error = %lagged, "Flow event subscriber lagged");
                None
            }
        })
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
