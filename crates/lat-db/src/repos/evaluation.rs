//! Evaluation repository: scorer definitions and their append-only results.

use chrono::{DateTime, Utc};

use lat_core::entities::{Evaluation, EvaluationResult};
use lat_core::enums::EntityType;

use crate::error::DatabaseError;
use crate::helpers::{ensure_exists, format_datetime, new_uuid, now, parse_datetime, stamp};
use crate::service::{LatService, finish};

fn row_to_evaluation(row: &libsql::Row) -> Result<Evaluation, DatabaseError> {
    Ok(Evaluation {
        id: row.get::<i64>(0)?,
        uuid: row.get::<String>(1)?,
        workspace_id: row.get::<i64>(2)?,
        name: row.get::<String>(3)?,
        prompt: row.get::<String>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_result(row: &libsql::Row) -> Result<EvaluationResult, DatabaseError> {
    Ok(EvaluationResult {
        id: row.get::<i64>(0)?,
        uuid: row.get::<String>(1)?,
        evaluation_id: row.get::<i64>(2)?,
        document_log_id: row.get::<i64>(3)?,
        result: row.get::<String>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl LatService {
    /// Define an evaluation in a workspace.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the workspace does not exist.
    pub async fn create_evaluation(
        &self,
        workspace_id: i64,
        name: &str,
        prompt: &str,
    ) -> Result<Evaluation, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            ensure_exists(&tx, EntityType::Workspace, workspace_id).await?;
            let mut rows = tx
                .query(
                    "INSERT INTO evaluations (uuid, workspace_id, name, prompt, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING id, uuid, workspace_id, name, prompt, created_at",
                    libsql::params![new_uuid(), workspace_id, name, prompt, format_datetime(now())],
                )
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            row_to_evaluation(&row)
        }
        .await;
        finish(tx, result).await
    }

    /// Get an evaluation by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no evaluation has this ID.
    pub async fn get_evaluation(&self, id: i64) -> Result<Evaluation, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, uuid, workspace_id, name, prompt, created_at FROM evaluations WHERE id = ?1",
                libsql::params![id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Evaluation, id))?;
        row_to_evaluation(&row)
    }

    /// Record the outcome of running an evaluation over a document log.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the evaluation or the log does not
    /// exist, `DatabaseError::InvalidState` if the log belongs to another
    /// workspace than the evaluation.
    pub async fn create_evaluation_result(
        &self,
        evaluation_id: i64,
        document_log_id: i64,
        result: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<EvaluationResult, DatabaseError> {
        let created_at = created_at.map_or_else(now, stamp);

        let tx = self.begin().await?;
        let outcome = async {
            ensure_exists(&tx, EntityType::Evaluation, evaluation_id).await?;
            ensure_exists(&tx, EntityType::DocumentLog, document_log_id).await?;

            let mut rows = tx
                .query(
                    "SELECT e.workspace_id = p.workspace_id
                     FROM evaluations e, document_logs l
                     JOIN commits c ON c.id = l.commit_id
                     JOIN projects p ON p.id = c.project_id
                     WHERE e.id = ?1 AND l.id = ?2",
                    libsql::params![evaluation_id, document_log_id],
                )
                .await?;
            let same_workspace = rows
                .next()
                .await?
                .map(|row| row.get::<i64>(0))
                .transpose()?
                .unwrap_or(0);
            if same_workspace == 0 {
                return Err(DatabaseError::InvalidState(format!(
                    "document log {document_log_id} is outside the workspace of evaluation {evaluation_id}"
                )));
            }

            let mut rows = tx
                .query(
                    "INSERT INTO evaluation_results (uuid, evaluation_id, document_log_id, result, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING id, uuid, evaluation_id, document_log_id, result, created_at",
                    libsql::params![
                        new_uuid(),
                        evaluation_id,
                        document_log_id,
                        result,
                        format_datetime(created_at),
                    ],
                )
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            row_to_result(&row)
        }
        .await;
        finish(tx, outcome).await
    }

    /// Evaluation results of one evaluation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_evaluation_results(
        &self,
        evaluation_id: i64,
    ) -> Result<Vec<EvaluationResult>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, uuid, evaluation_id, document_log_id, result, created_at
                 FROM evaluation_results WHERE evaluation_id = ?1
                 ORDER BY created_at, id",
                libsql::params![evaluation_id],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_result(&row)?);
        }
        Ok(results)
    }
}
