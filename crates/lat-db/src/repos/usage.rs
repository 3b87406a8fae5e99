//! Billable event counts and workspace usage.

use chrono::{DateTime, Utc};

use lat_core::billing::{self, WorkspaceUsage};
use lat_core::errors::CoreError;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, now, read_count};
use crate::service::LatService;

impl LatService {
    /// Document logs of every project in the workspace created at or after `since`.
    ///
    /// Destroyed projects still count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_document_logs(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM document_logs l
                 JOIN commits c ON c.id = l.commit_id
                 JOIN projects p ON p.id = c.project_id
                 WHERE p.workspace_id = ?1 AND l.created_at >= ?2",
                libsql::params![workspace_id, format_datetime(since)],
            )
            .await?;
        read_count(rows).await
    }

    /// Evaluation results of the workspace created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_evaluation_results(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM evaluation_results r
                 JOIN evaluations e ON e.id = r.evaluation_id
                 WHERE e.workspace_id = ?1 AND r.created_at >= ?2",
                libsql::params![workspace_id, format_datetime(since)],
            )
            .await?;
        read_count(rows).await
    }

    /// Usage of a workspace in its current billing cycle.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown workspace, `CoreError::Store`
    /// if a count fails.
    pub async fn workspace_usage(&self, workspace_id: i64) -> Result<WorkspaceUsage, CoreError> {
        self.workspace_usage_at(workspace_id, now()).await
    }

    /// Usage of a workspace in the billing cycle containing `now`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown workspace, `CoreError::Store`
    /// if a count fails.
    pub async fn workspace_usage_at(
        &self,
        workspace_id: i64,
        now: DateTime<Utc>,
    ) -> Result<WorkspaceUsage, CoreError> {
        let workspace = self.get_workspace(workspace_id).await?;
        billing::compute_workspace_usage(self, &workspace, now).await
    }
}
