//! Database error types for lat-db.

use lat_core::enums::EntityType;
use lat_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The referenced entity does not exist (or is outside the caller's scope).
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityType, id: String },

    /// The operation conflicts with the entity's lifecycle (e.g., editing a merged commit).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input rejected before reaching the database.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity: EntityType, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<DatabaseError> for CoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => Self::NotFound {
                entity_type: entity.to_string(),
                id,
            },
            DatabaseError::InvalidState(reason) => Self::InvalidState(reason),
            DatabaseError::Validation(reason) => Self::Validation(reason),
            other => Self::Store(Box::new(other)),
        }
    }
}
