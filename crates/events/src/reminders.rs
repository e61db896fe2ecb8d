//! RSVP reminders for families that have not answered.
//!
//! [`ReminderService::spawn`] is fire-and-forget: the admin request returns
//! immediately and every outcome is logged and recorded as a tracking event.
//! A failed send never aborts the rest of the batch.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::task::JoinHandle;
use vowline_core::magic_link::{rsvp_cutoff_passed, rsvp_link};
use vowline_core::templates::{MessageTemplate, TemplateType};
use vowline_core::tracking::TrackingEventType;
use vowline_core::types::DbId;
use vowline_db::models::family::Family;
use vowline_db::models::wedding::Wedding;
use vowline_db::repositories::{FamilyRepo, MessageTemplateRepo, ShortUrlRepo, WeddingRepo};
use vowline_db::DbPool;

use crate::bus::{TrackingBus, TrackingEvent};
use crate::compose::{compose, parse_templates};
use crate::delivery::MessageDispatcher;

/// Sends in flight at once per batch.
const SEND_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub sent: usize,
    pub failed: usize,
    /// Families with no reachable address on a configured channel.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Sent,
    Failed,
    Skipped,
}

impl ReminderReport {
    fn record(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Sent => self.sent += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
        self
    }
}

#[derive(Clone)]
pub struct ReminderService {
    pool: DbPool,
    bus: Arc<TrackingBus>,
    dispatcher: Arc<MessageDispatcher>,
    public_base_url: String,
}

impl ReminderService {
    pub fn new(
        pool: DbPool,
        bus: Arc<TrackingBus>,
        dispatcher: Arc<MessageDispatcher>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            bus,
            dispatcher,
            public_base_url: public_base_url.into(),
        }
    }

    /// Send reminders in the background.
    pub fn spawn(&self, wedding_id: DbId) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            match service.send_reminders(wedding_id).await {
                Ok(report) => tracing::info!(
                    wedding_id,
                    sent = report.sent,
                    failed = report.failed,
                    skipped = report.skipped,
                    "Reminder batch finished"
                ),
                Err(e) => tracing::error!(wedding_id, error = %e, "Reminder batch aborted"),
            }
        })
    }

    /// Remind every family of `wedding_id` that has not responded.
    ///
    /// Does nothing once the RSVP cutoff has passed.
    pub async fn send_reminders(&self, wedding_id: DbId) -> Result<ReminderReport, sqlx::Error> {
        let Some(wedding) = WeddingRepo::find_by_id(&self.pool, wedding_id).await? else {
            tracing::warn!(wedding_id, "Reminders requested for unknown wedding");
            return Ok(ReminderReport::default());
        };
        if rsvp_cutoff_passed(wedding.rsvp_cutoff_date, Utc::now()) {
            tracing::info!(wedding_id, "RSVP cutoff passed, no reminders sent");
            return Ok(ReminderReport::default());
        }

        let rows = MessageTemplateRepo::list_for_wedding(
            &self.pool,
            wedding_id,
            Some(TemplateType::Reminder.as_str()),
        )
        .await?;
        let templates = parse_templates(&rows);
        let families = FamilyRepo::list_pending(&self.pool, wedding_id).await?;
        tracing::debug!(wedding_id, pending = families.len(), "Sending RSVP reminders");

        let report = stream::iter(&families)
            .map(|family| self.remind_family(&wedding, family, &templates))
            .boxed()
            .buffer_unordered(SEND_CONCURRENCY)
            .fold(ReminderReport::default(), |report, outcome| async move {
                report.record(outcome)
            })
            .await;
        Ok(report)
    }

    async fn remind_family(
        &self,
        wedding: &Wedding,
        family: &Family,
        templates: &[MessageTemplate],
    ) -> Outcome {
        let rsvp_url = self.rsvp_url(family).await;
        let Some(message) = compose(
            TemplateType::Reminder,
            wedding,
            family,
            templates,
            &rsvp_url,
            |c| self.dispatcher.supports(c),
        ) else {
            tracing::debug!(family_id = family.id, "No usable channel, reminder skipped");
            return Outcome::Skipped;
        };

        let event = TrackingEvent::new(wedding.id, TrackingEventType::ReminderSent)
            .with_family(family.id)
            .with_channel(message.channel)
            .by_admin();

        match self.dispatcher.send(&message).await {
            Ok(()) => {
                self.bus.publish(event);
                Outcome::Sent
            }
            Err(e) => {
                tracing::warn!(
                    family_id = family.id,
                    channel = message.channel.as_str(),
                    error = %e,
                    "Reminder delivery failed"
                );
                let failed = TrackingEvent {
                    event_type: TrackingEventType::MessageFailed,
                    ..event
                }
                .with_metadata(serde_json::json!({
                    "template_type": TemplateType::Reminder.as_str(),
                    "error": e.to_string(),
                }));
                self.bus.publish(failed);
                Outcome::Failed
            }
        }
    }

    /// Short link when one can be issued, else the full magic link.
    async fn rsvp_url(&self, family: &Family) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        match ShortUrlRepo::get_or_create(&self.pool, family.id).await {
            Ok(Some(short)) => format!("{base}/s/{}", short.code),
            Ok(None) => rsvp_link(base, &family.magic_token),
            Err(e) => {
                tracing::warn!(family_id = family.id, error = %e, "Short URL lookup failed");
                rsvp_link(base, &family.magic_token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_outcomes() {
        let report = [Outcome::Sent, Outcome::Sent, Outcome::Failed, Outcome::Skipped]
            .into_iter()
            .fold(ReminderReport::default(), ReminderReport::record);
        assert_eq!(
            report,
            ReminderReport {
                sent: 2,
                failed: 1,
                skipped: 1
            }
        );
    }
}
