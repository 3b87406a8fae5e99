//! Project repository: workspace-scoped lookups, creation and destruction.

use lat_core::entities::{Commit, Project};
use lat_core::enums::EntityType;

use crate::error::DatabaseError;
use crate::helpers::{
    ensure_exists, format_datetime, get_opt_string, new_uuid, now, parse_datetime,
    parse_optional_datetime, read_returned_id,
};
use crate::service::{LatService, finish};

/// Title of the merged commit every project starts with.
pub const INITIAL_COMMIT_TITLE: &str = "Initial version";

const PROJECT_COLUMNS: &str = "id, workspace_id, name, created_at, deleted_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get::<i64>(0)?,
        workspace_id: row.get::<i64>(1)?,
        name: row.get::<String>(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
    })
}

/// Fetch a live project of a workspace on the given connection (or transaction).
async fn fetch_live_project(
    conn: &libsql::Connection,
    workspace_id: i64,
    project_id: i64,
) -> Result<Project, DatabaseError> {
    let sql = format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         WHERE id = ?1 AND workspace_id = ?2 AND deleted_at IS NULL"
    );
    let mut rows = conn
        .query(&sql, libsql::params![project_id, workspace_id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Project, project_id))?;
    row_to_project(&row)
}

impl LatService {
    /// Create a project together with its initial merged commit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the workspace does not exist.
    pub async fn create_project(
        &self,
        workspace_id: i64,
        name: &str,
    ) -> Result<(Project, Commit), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            ensure_exists(&tx, EntityType::Workspace, workspace_id).await?;

            let created_at = now();
            let ts = format_datetime(created_at);
            let rows = tx
                .query(
                    "INSERT INTO projects (workspace_id, name, created_at) VALUES (?1, ?2, ?3) RETURNING id",
                    libsql::params![workspace_id, name, ts.as_str()],
                )
                .await?;
            let project_id = read_returned_id(rows).await?;

            let uuid = new_uuid();
            let rows = tx
                .query(
                    "INSERT INTO commits (uuid, project_id, title, merged_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
                    libsql::params![uuid.as_str(), project_id, INITIAL_COMMIT_TITLE, ts.as_str()],
                )
                .await?;
            let commit_id = read_returned_id(rows).await?;

            Ok::<_, DatabaseError>((
                Project {
                    id: project_id,
                    workspace_id,
                    name: name.to_string(),
                    created_at,
                    deleted_at: None,
                },
                Commit {
                    id: commit_id,
                    uuid,
                    project_id,
                    title: INITIAL_COMMIT_TITLE.to_string(),
                    merged_at: Some(created_at),
                    created_at,
                },
            ))
        }
        .await;
        finish(tx, result).await
    }

    /// Find a live project inside a workspace.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project does not exist, belongs
    /// to another workspace, or was destroyed.
    pub async fn find_project(
        &self,
        workspace_id: i64,
        project_id: i64,
    ) -> Result<Project, DatabaseError> {
        fetch_live_project(self.db().conn(), workspace_id, project_id).await
    }

    /// List live projects of a workspace, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_projects(&self, workspace_id: i64) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE workspace_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at, id"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![workspace_id])
            .await?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    /// Destroy a project. Its history and logs stay on disk and keep counting
    /// toward workspace usage.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project is not live in the workspace.
    pub async fn destroy_project(
        &self,
        workspace_id: i64,
        project_id: i64,
    ) -> Result<Project, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let project = fetch_live_project(&tx, workspace_id, project_id).await?;
            let deleted_at = now();
            tx.execute(
                "UPDATE projects SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                libsql::params![format_datetime(deleted_at), project_id],
            )
            .await?;

            Ok::<_, DatabaseError>(Project {
                deleted_at: Some(deleted_at),
                ..project
            })
        }
        .await;

        let destroyed = finish(tx, result).await?;
        tracing::info!(workspace_id, project_id, "destroyed project");
        Ok(destroyed)
    }
}
