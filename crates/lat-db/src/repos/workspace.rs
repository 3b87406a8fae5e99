//! Workspace repository.

use chrono::{DateTime, Utc};

use lat_core::entities::Workspace;
use lat_core::enums::EntityType;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, now, parse_datetime, read_returned_id, stamp};
use crate::service::{LatService, finish};

impl LatService {
    /// Create a workspace. `created_at` defaults to now and anchors billing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_workspace(
        &self,
        name: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Workspace, DatabaseError> {
        let created_at = created_at.map_or_else(now, stamp);
        let tx = self.begin().await?;
        let result = async {
            let rows = tx
                .query(
                    "INSERT INTO workspaces (name, created_at) VALUES (?1, ?2) RETURNING id",
                    libsql::params![name, format_datetime(created_at)],
                )
                .await?;
            let id = read_returned_id(rows).await?;

            Ok::<_, DatabaseError>(Workspace {
                id,
                name: name.to_string(),
                created_at,
            })
        }
        .await;
        finish(tx, result).await
    }

    /// Get a workspace by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the workspace does not exist.
    pub async fn get_workspace(&self, id: i64) -> Result<Workspace, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, created_at FROM workspaces WHERE id = ?1",
                libsql::params![id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Workspace, id))?;
        Ok(Workspace {
            id: row.get::<i64>(0)?,
            name: row.get::<String>(1)?,
            created_at: parse_datetime(&row.get::<String>(2)?)?,
        })
    }
}
