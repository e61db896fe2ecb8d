//! `vowline-seed`: prepare a database for use.
//!
//! Runs migrations, upserts the built-in themes and, when
//! `MASTER_ADMIN_EMAIL` is set, the platform master admin. With `--reset`,
//! every tenant table is truncated first; themes and master admins are kept.
//!
//! ```text
//! DATABASE_URL=postgres://... vowline-seed [--reset]
//! ```

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vowline_api::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use vowline_core::roles::normalize_email;
use vowline_core::theme::system_themes;
use vowline_db::repositories::{MasterAdminRepo, ThemeRepo};
use vowline_db::DbPool;

/// Tenant data, children before parents.
const TENANT_TABLES: &[&str] = &[
    "notification_reads",
    "tracking_events",
    "payments",
    "wedding_providers",
    "short_urls",
    "family_members",
    "families",
    "tables",
    "message_templates",
    "invitation_templates",
    "wedding_admins",
    "weddings",
    "wedding_planners",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vowline_seed=info,vowline_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut reset = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--reset" => reset = true,
            other => bail!("Unknown argument '{other}'. Usage: vowline-seed [--reset]"),
        }
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = vowline_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    vowline_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    if reset {
        truncate_tenant_data(&pool).await?;
    }

    let seeded = ThemeRepo::seed_system(&pool, &system_themes())
        .await
        .context("Failed to seed system themes")?;
    tracing::info!(seeded, "System themes seeded");

    seed_master_admin(&pool).await?;

    tracing::info!("Seeding complete");
    Ok(())
}

async fn truncate_tenant_data(pool: &DbPool) -> anyhow::Result<()> {
    let statement = format!(
        "TRUNCATE {} RESTART IDENTITY CASCADE",
        TENANT_TABLES.join(", ")
    );
    sqlx::query(&statement)
        .execute(pool)
        .await
        .context("Failed to truncate tenant data")?;
    tracing::warn!(tables = TENANT_TABLES.len(), "Tenant data truncated");
    Ok(())
}

async fn seed_master_admin(pool: &DbPool) -> anyhow::Result<()> {
    let Ok(email) = std::env::var("MASTER_ADMIN_EMAIL") else {
        tracing::info!("MASTER_ADMIN_EMAIL not set, skipping master admin");
        return Ok(());
    };
    let email = normalize_email(&email);
    let name = std::env::var("MASTER_ADMIN_NAME").unwrap_or_else(|_| "Platform Admin".into());

    let hash = match std::env::var("MASTER_ADMIN_PASSWORD") {
        Ok(password) => {
            if let Err(msg) = validate_password_strength(&password, MIN_PASSWORD_LENGTH) {
                bail!("MASTER_ADMIN_PASSWORD rejected: {msg}");
            }
            Some(hash_password(&password).map_err(|e| anyhow::anyhow!("Password hashing error: {e}"))?)
        }
        Err(_) => None,
    };

    let admin = MasterAdminRepo::upsert(pool, &email, &name, hash.as_deref())
        .await
        .context("Failed to upsert master admin")?;
    tracing::info!(admin_id = admin.id, email = %admin.email, "Master admin ready");
    Ok(())
}
