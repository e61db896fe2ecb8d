//! Durable tracking-event persistence.
//!
//! [`TrackingPersistence`] subscribes to the [`TrackingBus`](crate::TrackingBus)
//! and appends every received event to `tracking_events`. It exits when the
//! bus is dropped.

use tokio::sync::broadcast;
use vowline_core::types::DbId;
use vowline_db::models::tracking::NewTrackingEvent;
use vowline_db::repositories::TrackingEventRepo;
use vowline_db::DbPool;

use crate::bus::TrackingEvent;

pub struct TrackingPersistence;

impl TrackingPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<TrackingEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            wedding_id = event.wedding_id,
                            event_type = event.event_type.as_str(),
                            "Failed to persist tracking event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Tracking persistence lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Tracking bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &TrackingEvent) -> Result<DbId, sqlx::Error> {
        TrackingEventRepo::insert(pool, &to_row(event)).await
    }
}

fn to_row(event: &TrackingEvent) -> NewTrackingEvent {
    NewTrackingEvent {
        wedding_id: event.wedding_id,
        family_id: event.family_id,
        event_type: event.event_type.as_str().to_string(),
        channel: event.channel.map(|c| c.as_str().to_string()),
        metadata: event.metadata.clone(),
        admin_triggered: event.admin_triggered,
    }
}

#[cfg(test)]
mod tests {
    use vowline_core::channels::Channel;
    use vowline_core::tracking::TrackingEventType;

    use super::*;

    #[test]
    fn row_uses_wire_names() {
        let event = TrackingEvent::new(4, TrackingEventType::MessageFailed)
            .with_family(2)
            .with_channel(Channel::Whatsapp);
        let row = to_row(&event);
        assert_eq!(row.event_type, "MESSAGE_FAILED");
        assert_eq!(row.channel.as_deref(), Some("WHATSAPP"));
        assert_eq!(row.family_id, Some(2));
    }
}
