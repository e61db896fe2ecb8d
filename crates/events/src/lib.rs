//! Vowline tracking events and outbound messaging.
//!
//! - [`TrackingBus`]: in-process publish/subscribe hub for [`TrackingEvent`]s,
//!   backed by `tokio::sync::broadcast`.
//! - [`TrackingPersistence`]: background loop that appends every event to the
//!   `tracking_events` table.
//! - [`delivery`]: Resend and SMTP email, Twilio SMS and WhatsApp, routed per
//!   channel by [`MessageDispatcher`].
//! - [`ReminderService`]: fire-and-forget RSVP reminders for families that
//!   have not answered.

pub mod bus;
pub mod compose;
pub mod delivery;
pub mod persistence;
pub mod reminders;

pub use bus::{TrackingBus, TrackingEvent};
pub use delivery::{DeliveryError, MessageDispatcher, OutboundMessage};
pub use persistence::TrackingPersistence;
pub use reminders::{ReminderReport, ReminderService};
