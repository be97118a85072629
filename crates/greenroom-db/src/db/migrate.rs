//! Startup schema migration.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// ## Summary
/// Applies any pending migrations over a synchronous connection.
///
/// Runs once at startup before the async pool is used; wrap in
/// `spawn_blocking` from async contexts.
///
/// ## Errors
/// Returns an error if connecting or applying a migration fails.
pub fn run_pending_migrations(database_url: &str) -> anyhow::Result<()> {
    let mut conn = PgConnection::establish(database_url)?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Migration failed: {e}"))?;

    for version in &applied {
        tracing::info!(migration = %version, "Applied migration");
    }

    Ok(())
}
