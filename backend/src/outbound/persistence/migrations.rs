//! Embedded schema migrations.
//!
//! The server applies these at startup unless `skip_migrations` is set, and
//! the integration tests use them to build their template database.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Why migrations could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The blocking connection could not be opened.
    #[error("failed to connect for migrations: {message}")]
    Connect {
        /// Driver description of the failure.
        message: String,
    },
    /// A migration failed; earlier ones in the same run stay applied.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Harness description of the failure.
        message: String,
    },
}

/// Apply every pending migration over a blocking connection.
///
/// Returns how many migrations ran. Call from `spawn_blocking` when inside an
/// async runtime.
///
/// # Errors
/// [`MigrationError::Connect`] or [`MigrationError::Apply`].
pub fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        message: err.to_string(),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.len())
}
