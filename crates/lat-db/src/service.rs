//! Service layer hosting all repository methods.
//!
//! `LatService` wraps `LatDb` (raw database access) plus the settings repos
//! need. All repo methods are implemented as `impl LatService` blocks under
//! `repos/`.

use lat_config::LatConfig;

use crate::LatDb;
use crate::error::DatabaseError;

/// Page size used when neither the caller nor the config provides one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Orchestrates reads and transactional mutations over one database.
///
/// Every mutation method follows this protocol:
/// 1. Begin transaction
/// 2. Validate lifecycle state and execute SQL
/// 3. Commit on success, roll back on any error
pub struct LatService {
    db: LatDb,
    default_page_size: u32,
}

impl LatService {
    /// Create a service over a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = LatDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create a service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &LatConfig) -> Result<Self, DatabaseError> {
        let db = LatDb::open(&config.database).await?;
        Ok(Self {
            db,
            default_page_size: config.general.default_page_size,
        })
    }

    /// Create from an existing `LatDb` (for testing).
    #[must_use]
    pub const fn from_db(db: LatDb) -> Self {
        Self {
            db,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LatDb {
        &self.db
    }

    /// Page size applied to listings without an explicit one.
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Begin a transaction on the service connection.
    pub(crate) async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self.db.conn().transaction().await?)
    }
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
///
/// The original error is returned even if the rollback itself fails.
pub(crate) async fn finish<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(%rollback, %error, "transaction rollback failed");
            }
            Err(error)
        }
    }
}
