//! Document version repository.
//!
//! Versions are written only inside drafts. Reads come in two flavours:
//! history-resolved (`documents_at_commit`) and exact-row (`get_document`).

use chrono::{DateTime, Utc};

use lat_core::entities::DocumentVersion;
use lat_core::enums::EntityType;
use lat_core::errors::CoreError;
use lat_core::resolve;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, new_uuid, now, parse_datetime, read_returned_id};
use crate::repos::commit::fetch_draft;
use crate::service::{LatService, finish};

const VERSION_COLUMNS: &str =
    "dv.id, dv.document_uuid, dv.commit_id, dv.path, dv.content, dv.created_at, dv.updated_at";

fn row_to_version(row: &libsql::Row) -> Result<DocumentVersion, DatabaseError> {
    Ok(DocumentVersion {
        id: row.get::<i64>(0)?,
        document_uuid: row.get::<String>(1)?,
        commit_id: row.get::<i64>(2)?,
        path: row.get::<String>(3)?,
        content: get_opt_string(row, 4)?.unwrap_or_default(),
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn fetch_version(
    conn: &libsql::Connection,
    id: i64,
) -> Result<DocumentVersion, DatabaseError> {
    let sql = format!("SELECT {VERSION_COLUMNS} FROM document_versions dv WHERE dv.id = ?1");
    let mut rows = conn.query(&sql, libsql::params![id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::DocumentVersion, id))?;
    row_to_version(&row)
}

async fn collect_versions(mut rows: libsql::Rows) -> Result<Vec<DocumentVersion>, DatabaseError> {
    let mut versions = Vec::new();
    while let Some(row) = rows.next().await? {
        versions.push(row_to_version(&row)?);
    }
    Ok(versions)
}

impl LatService {
    /// Create a new document in a draft.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the commit is merged or the
    /// path is already taken at that commit, `DatabaseError::Validation` for
    /// an empty path.
    pub async fn create_document(
        &self,
        commit_id: i64,
        path: &str,
        content: &str,
    ) -> Result<DocumentVersion, DatabaseError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(DatabaseError::Validation("document path must not be empty".into()));
        }

        let tx = self.begin().await?;
        let result = async {
            let draft = fetch_draft(&tx, commit_id).await?;
            let history = self.list_latest_merged_versions(draft.project_id, None).await?;
            let edits = self.list_versions_in_commit(draft.id).await?;
            let current = resolve::overlay_draft(history, edits);
            if current.iter().any(|d| d.path == path) {
                return Err(DatabaseError::InvalidState(format!(
                    "a document already exists at path '{path}'"
                )));
            }

            let ts = format_datetime(now());
            let rows = tx
                .query(
                    "INSERT INTO document_versions (document_uuid, commit_id, path, content, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id",
                    libsql::params![new_uuid(), commit_id, path, content, ts],
                )
                .await?;
            let id = read_returned_id(rows).await?;
            fetch_version(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Write new content for an existing document inside a draft.
    ///
    /// Updates the draft's own version if it has one, otherwise branches a
    /// new version off the document's latest merged path.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the commit is merged, or
    /// `DatabaseError::NotFound` if the document has no merged history.
    pub async fn update_document(
        &self,
        commit_id: i64,
        document_uuid: &str,
        content: &str,
    ) -> Result<DocumentVersion, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let draft = fetch_draft(&tx, commit_id).await?;
            let ts = format_datetime(now());

            let mut rows = tx
                .query(
                    "SELECT id FROM document_versions WHERE commit_id = ?1 AND document_uuid = ?2",
                    libsql::params![commit_id, document_uuid],
                )
                .await?;
            if let Some(row) = rows.next().await? {
                let id = row.get::<i64>(0)?;
                tx.execute(
                    "UPDATE document_versions SET content = ?1, updated_at = ?2 WHERE id = ?3",
                    libsql::params![content, ts.as_str(), id],
                )
                .await?;
                return fetch_version(&tx, id).await;
            }

            let mut rows = tx
                .query(
                    "SELECT dv.path FROM document_versions dv
                     JOIN commits c ON c.id = dv.commit_id
                     WHERE c.project_id = ?1 AND c.merged_at IS NOT NULL AND dv.document_uuid = ?2
                     ORDER BY c.merged_at DESC LIMIT 1",
                    libsql::params![draft.project_id, document_uuid],
                )
                .await?;
            let row = rows
                .next()
                .await?
                .ok_or_else(|| DatabaseError::not_found(EntityType::DocumentVersion, document_uuid))?;
            let path = row.get::<String>(0)?;

            let rows = tx
                .query(
                    "INSERT INTO document_versions (document_uuid, commit_id, path, content, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id",
                    libsql::params![document_uuid, commit_id, path, content, ts.as_str()],
                )
                .await?;
            let id = read_returned_id(rows).await?;
            fetch_version(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Latest merged version of every document in a project.
    ///
    /// Groups versions by `document_uuid` and keeps the one whose commit has
    /// the greatest `merged_at`, optionally capped at `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_latest_merged_versions(
        &self,
        project_id: i64,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentVersion>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![project_id.into()];
        let cutoff = match as_of {
            Some(as_of) => {
                params.push(format_datetime(as_of).into());
                "AND c.merged_at <= ?2"
            }
            None => "",
        };

        let sql = format!(
            "WITH latest AS (
                 SELECT dv.document_uuid AS document_uuid, MAX(c.merged_at) AS max_merged_at
                 FROM document_versions dv
                 JOIN commits c ON c.id = dv.commit_id
                 WHERE c.project_id = ?1 AND c.merged_at IS NOT NULL {cutoff}
                 GROUP BY dv.document_uuid
             )
             SELECT {VERSION_COLUMNS}
             FROM document_versions dv
             JOIN commits c ON c.id = dv.commit_id AND c.merged_at IS NOT NULL
             JOIN latest l ON l.document_uuid = dv.document_uuid AND l.max_merged_at = c.merged_at
             WHERE c.project_id = ?1
             ORDER BY dv.path, dv.id"
        );
        let rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        collect_versions(rows).await
    }

    /// All versions owned by exactly this commit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_versions_in_commit(
        &self,
        commit_id: i64,
    ) -> Result<Vec<DocumentVersion>, DatabaseError> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM document_versions dv
             WHERE dv.commit_id = ?1 ORDER BY dv.path, dv.id"
        );
        let rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![commit_id])
            .await?;
        collect_versions(rows).await
    }

    /// Content of one exact `(commit, document)` row. NULL content reads as `""`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_document_content(
        &self,
        commit_id: i64,
        document_id: i64,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT content FROM document_versions WHERE id = ?1 AND commit_id = ?2",
                libsql::params![document_id, commit_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<Option<String>>(0)?.unwrap_or_default())),
            None => Ok(None),
        }
    }

    /// Documents of a project as they exist at `commit_uuid`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the commit is not in the project.
    pub async fn documents_at_commit(
        &self,
        project_id: i64,
        commit_uuid: &str,
    ) -> Result<Vec<DocumentVersion>, CoreError> {
        resolve::resolve_documents_at_commit(self, project_id, commit_uuid).await
    }

    /// Content of document `document_id` as stored at exactly `commit_uuid`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the commit or the document row is missing.
    pub async fn get_document(
        &self,
        project_id: i64,
        commit_uuid: &str,
        document_id: i64,
    ) -> Result<String, CoreError> {
        resolve::get_document(self, project_id, commit_uuid, document_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::helpers::{test_project, test_service};

    use super::*;

    #[tokio::test]
    async fn create_document_only_in_drafts() {
        let svc = test_service().await;
        let (_, _, initial) = test_project(&svc).await;
        let err = svc
            .create_document(initial.id, "foo", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn create_document_rejects_taken_path() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;
        let draft = svc.create_draft(project.id, "d").await.unwrap();
        svc.create_document(draft.id, "foo", "a").await.unwrap();

        let err = svc.create_document(draft.id, "foo", "b").await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert!(matches!(
            svc.create_document(draft.id, "  ", "b").await.unwrap_err(),
            DatabaseError::Validation(_)
        ));
        assert_eq!(svc.list_versions_in_commit(draft.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_document_branches_then_edits_in_place() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;
        let first = svc.create_draft(project.id, "first").await.unwrap();
        let created = svc.create_document(first.id, "foo", "v1").await.unwrap();
        svc.merge_commit(first.id).await.unwrap();

        let second = svc.create_draft(project.id, "second").await.unwrap();
        let branched = svc
            .update_document(second.id, &created.document_uuid, "v2")
            .await
            .unwrap();
        assert_eq!(branched.commit_id, second.id);
        assert_eq!(branched.path, "foo");
        assert_ne!(branched.id, created.id);

        let edited = svc
            .update_document(second.id, &created.document_uuid, "v3")
            .await
            .unwrap();
        assert_eq!(edited.id, branched.id);
        assert_eq!(edited.content, "v3");
        assert_eq!(svc.list_versions_in_commit(second.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_document_is_not_found() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;
        let draft = svc.create_draft(project.id, "d").await.unwrap();
        let err = svc
            .update_document(draft.id, "no-such-doc", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn null_content_reads_as_empty_string() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;
        let draft = svc.create_draft(project.id, "d").await.unwrap();
        let doc = svc.create_document(draft.id, "foo", "x").await.unwrap();
        svc.db()
            .conn()
            .execute(
                "UPDATE document_versions SET content = NULL WHERE id = ?1",
                libsql::params![doc.id],
            )
            .await
            .unwrap();

        let content = svc
            .get_document(project.id, &draft.uuid, doc.id)
            .await
            .unwrap();
        assert_eq!(content, "");
    }
}
