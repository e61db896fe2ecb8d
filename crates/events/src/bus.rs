//! In-process tracking bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish [`TrackingEvent`]s and move on; persistence happens on a
//! subscriber task, so a slow or failing database never delays a guest's
//! request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vowline_core::channels::Channel;
use vowline_core::tracking::TrackingEventType;
use vowline_core::types::DbId;

// ---------------------------------------------------------------------------
// TrackingEvent
// ---------------------------------------------------------------------------

/// An engagement action on one wedding.
///
/// Constructed via [`TrackingEvent::new`] and enriched with the builder
/// methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub wedding_id: DbId,
    pub event_type: TrackingEventType,
    pub family_id: Option<DbId>,
    pub channel: Option<Channel>,
    /// Free-form JSON payload carrying event-specific data.
    pub metadata: serde_json::Value,
    /// Set when an admin action (not the guest) caused the event.
    pub admin_triggered: bool,
    pub timestamp: DateTime<Utc>,
}

impl TrackingEvent {
    pub fn new(wedding_id: DbId, event_type: TrackingEventType) -> Self {
        Self {
            wedding_id,
            event_type,
            family_id: None,
            channel: None,
            metadata: serde_json::Value::Object(Default::default()),
            admin_triggered: false,
            timestamp: Utc::now(),
        }
    }

    pub fn with_family(mut self, family_id: DbId) -> Self {
        self.family_id = Some(family_id);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn by_admin(mut self) -> Self {
        self.admin_triggered = true;
        self
    }
}

// ---------------------------------------------------------------------------
// TrackingBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus, shared as `Arc<TrackingBus>`.
pub struct TrackingBus {
    sender: broadcast::Sender<TrackingEvent>,
}

impl TrackingBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: TrackingEvent) {
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackingEvent> {
        self.sender.subscribe()
    }
}

impl Default for TrackingBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
