use std::sync::Arc;

use vowline_events::{MessageDispatcher, ReminderService, TrackingBus};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vowline_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// In-process tracking-event bus.
    pub tracking: Arc<TrackingBus>,
    /// Outbound email/SMS/WhatsApp routing.
    pub dispatcher: Arc<MessageDispatcher>,
    /// Fire-and-forget RSVP reminder sender.
    pub reminders: ReminderService,
}

impl AppState {
    /// Wire the shared services around a pool and configuration.
    pub fn new(
        pool: vowline_db::DbPool,
        config: ServerConfig,
        tracking: Arc<TrackingBus>,
        dispatcher: Arc<MessageDispatcher>,
    ) -> Self {
        let reminders = ReminderService::new(
            pool.clone(),
            Arc::clone(&tracking),
            Arc::clone(&dispatcher),
            config.public_base_url.clone(),
        );
        Self {
            pool,
            config: Arc::new(config),
            tracking,
            dispatcher,
            reminders,
        }
    }
}
