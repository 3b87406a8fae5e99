//! # lat-db
//!
//! libSQL database operations for Latitude.
//!
//! Handles all relational state: workspaces, projects, commits, document
//! versions, document logs, evaluations and evaluation results. Implements
//! the `lat-core` store traits so the commit resolver and the usage
//! metering engine run directly against the database.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and a single connection.
pub struct LatDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LatDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Enables foreign keys and runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_with(path, true).await
    }

    /// Open the database described by the `[database]` config section.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(config: &lat_config::DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.is_in_memory() {
            tracing::warn!("database is in memory; nothing will be persisted");
        }
        Self::open_with(&config.path, config.foreign_keys).await
    }

    async fn open_with(path: &str, foreign_keys: bool) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Must be set per-connection in SQLite
        if foreign_keys {
            conn.execute("PRAGMA foreign_keys = ON", ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        }

        let lat_db = Self { db, conn };
        lat_db.run_migrations().await?;
        tracing::debug!(path, "opened database");
        Ok(lat_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
