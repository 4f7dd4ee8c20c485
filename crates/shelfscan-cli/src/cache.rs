//! `shelfscan cache` subcommands.

use chrono::Utc;
use shelfscan_core::AppConfig;

/// Connects to the configured database and applies pending migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the connection fails, or a
/// migration fails.
pub(crate) async fn connect_and_migrate(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = shelfscan_db::connect_pool_from_config(config).await?;
    let applied = shelfscan_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied database migrations");
    }
    Ok(pool)
}

/// Delete expired rows from the persistent cache.
///
/// # Errors
///
/// Returns an error if no database is configured or the delete fails.
pub(crate) async fn run_cache_purge(config: &AppConfig) -> anyhow::Result<()> {
    if config.database_url.is_none() {
        anyhow::bail!("DATABASE_URL is not set; the in-memory cache does not outlive the process");
    }
    let pool = connect_and_migrate(config).await?;
    let purged = shelfscan_db::purge_expired(&pool, Utc::now()).await?;
    println!("purged {purged} expired cache entries");
    Ok(())
}
