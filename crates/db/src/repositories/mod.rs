//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Queries on tenant data take
//! the owning `wedding_id` so that one wedding can never read another's rows.

use vowline_core::error::CoreError;

pub mod family_member_repo;
pub mod family_repo;
pub mod invitation_template_repo;
pub mod master_admin_repo;
pub mod message_template_repo;
pub mod notification_read_repo;
pub mod payment_repo;
pub mod planner_repo;
pub mod provider_repo;
pub mod short_url_repo;
pub mod table_repo;
pub mod theme_repo;
pub mod tracking_event_repo;
pub mod wedding_admin_repo;
pub mod wedding_repo;

pub use family_member_repo::FamilyMemberRepo;
pub use family_repo::FamilyRepo;
pub use invitation_template_repo::InvitationTemplateRepo;
pub use master_admin_repo::MasterAdminRepo;
pub use message_template_repo::MessageTemplateRepo;
pub use notification_read_repo::NotificationReadRepo;
pub use payment_repo::PaymentRepo;
pub use planner_repo::PlannerRepo;
pub use provider_repo::ProviderRepo;
pub use short_url_repo::ShortUrlRepo;
pub use table_repo::TableRepo;
pub use theme_repo::ThemeRepo;
pub use tracking_event_repo::TrackingEventRepo;
pub use wedding_admin_repo::WeddingAdminRepo;
pub use wedding_repo::WeddingRepo;

/// Failure of a write that re-checks a business rule under a row lock.
#[derive(Debug, thiserror::Error)]
pub enum GuardedWriteError {
    /// The write was rejected by a capacity, limit or ownership rule.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
