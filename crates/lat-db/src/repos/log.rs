//! Document log repository. Logs are append-only: insert and read, never update.

use lat_core::entities::{DocumentLog, NewDocumentLog};
use lat_core::enums::EntityType;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, new_uuid, now, parse_datetime, parse_json, read_returned_id,
    stamp,
};
use crate::repos::commit::fetch_commit;
use crate::service::{LatService, finish};

const LOG_COLUMNS: &str = "id, uuid, document_uuid, commit_id, parameters, resolved_content, \
                           custom_identifier, duration_ms, created_at";

fn row_to_log(row: &libsql::Row) -> Result<DocumentLog, DatabaseError> {
    Ok(DocumentLog {
        id: row.get::<i64>(0)?,
        uuid: row.get::<String>(1)?,
        document_uuid: row.get::<String>(2)?,
        commit_id: row.get::<i64>(3)?,
        parameters: parse_json(get_opt_string(row, 4)?.as_deref())?,
        resolved_content: row.get::<String>(5)?,
        custom_identifier: get_opt_string(row, 6)?,
        duration_ms: row.get::<i64>(7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

async fn fetch_log(conn: &libsql::Connection, id: i64) -> Result<DocumentLog, DatabaseError> {
    let sql = format!("SELECT {LOG_COLUMNS} FROM document_logs WHERE id = ?1");
    let mut rows = conn.query(&sql, libsql::params![id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::DocumentLog, id))?;
    row_to_log(&row)
}

impl LatService {
    /// Record one execution of a document at a commit.
    ///
    /// `input.created_at` overrides the insertion time (used for backfills).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the commit does not exist,
    /// `DatabaseError::Validation` for a negative duration.
    pub async fn create_document_log(
        &self,
        commit_id: i64,
        input: &NewDocumentLog,
    ) -> Result<DocumentLog, DatabaseError> {
        if input.duration_ms < 0 {
            return Err(DatabaseError::Validation(format!(
                "duration_ms must not be negative, got {}",
                input.duration_ms
            )));
        }

        let parameters = if input.parameters.is_null() {
            "{}".to_string()
        } else {
            input.parameters.to_string()
        };
        let created_at = input.created_at.map_or_else(now, stamp);

        let tx = self.begin().await?;
        let result = async {
            fetch_commit(&tx, commit_id).await?;
            let rows = tx
                .query(
                    "INSERT INTO document_logs
                     (uuid, document_uuid, commit_id, parameters, resolved_content, custom_identifier, duration_ms, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
                    libsql::params![
                        new_uuid(),
                        input.document_uuid.as_str(),
                        commit_id,
                        parameters.as_str(),
                        input.resolved_content.as_str(),
                        input.custom_identifier.clone(),
                        input.duration_ms,
                        format_datetime(created_at),
                    ],
                )
                .await?;
            let id = read_returned_id(rows).await?;
            fetch_log(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Get a document log by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no log has this ID.
    pub async fn get_document_log(&self, id: i64) -> Result<DocumentLog, DatabaseError> {
        fetch_log(self.db().conn(), id).await
    }
}
