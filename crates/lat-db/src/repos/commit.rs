//! Commit repository.
//!
//! Commits start as drafts and are merged exactly once. Merge timestamps of
//! a project are strictly increasing, which keeps every document's merged
//! history linear.

use chrono::{DateTime, Duration, Utc};

use lat_core::entities::Commit;
use lat_core::enums::{CommitStatus, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{
    ensure_exists, format_datetime, get_opt_string, new_uuid, now, parse_datetime,
    parse_optional_datetime, read_returned_id, stamp,
};
use crate::service::{LatService, finish};

pub(crate) const COMMIT_COLUMNS: &str = "id, uuid, project_id, title, merged_at, created_at";

/// Filter and pagination for commit listings.
///
/// With neither `page` nor `page_size` set every matching commit is returned.
/// Otherwise `page` (1-based) defaults to 1 and `page_size` to the service's
/// configured default.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitFilter {
    pub status: CommitStatus,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub(crate) fn row_to_commit(row: &libsql::Row) -> Result<Commit, DatabaseError> {
    Ok(Commit {
        id: row.get::<i64>(0)?,
        uuid: row.get::<String>(1)?,
        project_id: row.get::<i64>(2)?,
        title: row.get::<String>(3)?,
        merged_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Fetch a commit by ID on the given connection (or transaction).
pub(crate) async fn fetch_commit(
    conn: &libsql::Connection,
    commit_id: i64,
) -> Result<Commit, DatabaseError> {
    let sql = format!("SELECT {COMMIT_COLUMNS} FROM commits WHERE id = ?1");
    let mut rows = conn.query(&sql, libsql::params![commit_id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityType::Commit, commit_id))?;
    row_to_commit(&row)
}

/// Fetch a commit and fail unless it is still a draft.
pub(crate) async fn fetch_draft(
    conn: &libsql::Connection,
    commit_id: i64,
) -> Result<Commit, DatabaseError> {
    let commit = fetch_commit(conn, commit_id).await?;
    if commit.is_merged() {
        return Err(DatabaseError::InvalidState(format!(
            "commit {} is merged and cannot be edited",
            commit.uuid
        )));
    }
    Ok(commit)
}

impl LatService {
    /// Open a new draft commit in a project.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project does not exist.
    pub async fn create_draft(&self, project_id: i64, title: &str) -> Result<Commit, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            ensure_exists(&tx, EntityType::Project, project_id).await?;

            let uuid = new_uuid();
            let created_at = now();
            let rows = tx
                .query(
                    "INSERT INTO commits (uuid, project_id, title, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING id",
                    libsql::params![uuid.as_str(), project_id, title, format_datetime(created_at)],
                )
                .await?;
            let id = read_returned_id(rows).await?;

            Ok::<_, DatabaseError>(Commit {
                id,
                uuid,
                project_id,
                title: title.to_string(),
                merged_at: None,
                created_at,
            })
        }
        .await;
        finish(tx, result).await
    }

    /// Get a commit by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the commit does not exist.
    pub async fn get_commit(&self, commit_id: i64) -> Result<Commit, DatabaseError> {
        fetch_commit(self.db().conn(), commit_id).await
    }

    /// Get a commit by UUID within a project.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project has no such commit.
    pub async fn get_commit_by_uuid(
        &self,
        project_id: i64,
        commit_uuid: &str,
    ) -> Result<Commit, DatabaseError> {
        let sql = format!("SELECT {COMMIT_COLUMNS} FROM commits WHERE uuid = ?1 AND project_id = ?2");
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![commit_uuid, project_id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Commit, commit_uuid))?;
        row_to_commit(&row)
    }

    /// List commits of a workspace project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project is not live in the workspace.
    pub async fn get_commits_by_project(
        &self,
        workspace_id: i64,
        project_id: i64,
        filter: &CommitFilter,
    ) -> Result<Vec<Commit>, DatabaseError> {
        self.find_project(workspace_id, project_id).await?;

        let status_clause = match filter.status {
            CommitStatus::All => "",
            CommitStatus::Merged => "AND merged_at IS NOT NULL",
            CommitStatus::Draft => "AND merged_at IS NULL",
        };

        let mut params: Vec<libsql::Value> = vec![project_id.into()];
        let pagination = if filter.page.is_none() && filter.page_size.is_none() {
            String::new()
        } else {
            let page = filter.page.unwrap_or(1).max(1);
            let page_size = filter
                .page_size
                .unwrap_or_else(|| self.default_page_size())
                .max(1);
            params.push(i64::from(page_size).into());
            params.push((i64::from(page - 1) * i64::from(page_size)).into());
            "LIMIT ?2 OFFSET ?3".to_string()
        };

        let sql = format!(
            "SELECT {COMMIT_COLUMNS} FROM commits
             WHERE project_id = ?1 {status_clause}
             ORDER BY created_at, id {pagination}"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut commits = Vec::new();
        while let Some(row) = rows.next().await? {
            commits.push(row_to_commit(&row)?);
        }
        Ok(commits)
    }

    /// Merge a draft now.
    ///
    /// If the clock has not advanced past the project's latest merge, the
    /// merge is stamped one microsecond after it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the commit is already merged.
    pub async fn merge_commit(&self, commit_id: i64) -> Result<Commit, DatabaseError> {
        self.merge_with(commit_id, None).await
    }

    /// Merge a draft at an explicit time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the commit is already merged
    /// or `merged_at` is not after the project's latest merge.
    pub async fn merge_commit_at(
        &self,
        commit_id: i64,
        merged_at: DateTime<Utc>,
    ) -> Result<Commit, DatabaseError> {
        self.merge_with(commit_id, Some(merged_at)).await
    }

    async fn merge_with(
        &self,
        commit_id: i64,
        requested: Option<DateTime<Utc>>,
    ) -> Result<Commit, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let commit = fetch_commit(&tx, commit_id).await?;
            if commit.is_merged() {
                return Err(DatabaseError::InvalidState(format!(
                    "commit {} is already merged",
                    commit.uuid
                )));
            }

            let mut rows = tx
                .query(
                    "SELECT MAX(merged_at) FROM commits WHERE project_id = ?1 AND merged_at IS NOT NULL",
                    libsql::params![commit.project_id],
                )
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            let latest = parse_optional_datetime(get_opt_string(&row, 0)?.as_deref())?;

            let merged_at = match requested {
                Some(at) => {
                    let at = stamp(at);
                    if latest.is_some_and(|latest| at <= latest) {
                        return Err(DatabaseError::InvalidState(format!(
                            "merge time {at} is not after the project's latest merge"
                        )));
                    }
                    at
                }
                None => {
                    let at = now();
                    match latest {
                        Some(latest) if latest >= at => latest + Duration::microseconds(1),
                        _ => at,
                    }
                }
            };

            tx.execute(
                "UPDATE commits SET merged_at = ?1 WHERE id = ?2 AND merged_at IS NULL",
                libsql::params![format_datetime(merged_at), commit_id],
            )
            .await?;

            Ok::<_, DatabaseError>(Commit {
                merged_at: Some(merged_at),
                ..commit
            })
        }
        .await;

        let merged = finish(tx, result).await?;
        tracing::info!(
            commit_id,
            project_id = merged.project_id,
            uuid = %merged.uuid,
            "merged commit"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::test_support::helpers::{test_project, test_service};

    use super::*;

    #[tokio::test]
    async fn draft_lifecycle() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;

        let draft = svc.create_draft(project.id, "edit prompts").await.unwrap();
        assert!(draft.is_draft());
        assert_eq!(svc.get_commit(draft.id).await.unwrap(), draft);
        assert_eq!(
            svc.get_commit_by_uuid(project.id, &draft.uuid).await.unwrap(),
            draft
        );

        let merged = svc.merge_commit(draft.id).await.unwrap();
        assert!(merged.is_merged());
        assert_eq!(svc.get_commit(draft.id).await.unwrap(), merged);
    }

    #[tokio::test]
    async fn merging_twice_is_rejected() {
        let svc = test_service().await;
        let (_, project, initial) = test_project(&svc).await;
        let err = svc.merge_commit(initial.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));

        let draft = svc.create_draft(project.id, "d").await.unwrap();
        svc.merge_commit(draft.id).await.unwrap();
        assert!(svc.merge_commit(draft.id).await.is_err());
    }

    #[tokio::test]
    async fn merge_times_strictly_increase() {
        let svc = test_service().await;
        let (_, project, initial) = test_project(&svc).await;

        let mut previous = initial.merged_at.unwrap();
        for i in 0..5 {
            let draft = svc.create_draft(project.id, &format!("d{i}")).await.unwrap();
            let merged = svc.merge_commit(draft.id).await.unwrap();
            let merged_at = merged.merged_at.unwrap();
            assert!(merged_at > previous);
            previous = merged_at;
        }
    }

    #[tokio::test]
    async fn explicit_merge_time_must_follow_latest_merge() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;
        let draft = svc.create_draft(project.id, "d").await.unwrap();

        let past = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let err = svc.merge_commit_at(draft.id, past).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert!(svc.get_commit(draft.id).await.unwrap().is_draft());
    }

    #[tokio::test]
    async fn commit_uuid_lookup_is_project_scoped() {
        let svc = test_service().await;
        let (ws, project, initial) = test_project(&svc).await;
        let (other, _) = svc.create_project(ws.id, "other").await.unwrap();

        assert!(svc.get_commit_by_uuid(project.id, &initial.uuid).await.is_ok());
        let err = svc
            .get_commit_by_uuid(other.id, &initial.uuid)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn draft_in_unknown_project_rolls_back() {
        let svc = test_service().await;
        let (_, project, _) = test_project(&svc).await;

        let err = svc.create_draft(77, "d").await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound {
                entity: EntityType::Project,
                ..
            }
        ));

        let mut rows = svc
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM commits", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);

        // The failed transaction must not leave the connection mid-transaction.
        let draft = svc.create_draft(project.id, "after failure").await.unwrap();
        assert_eq!(svc.get_commit(draft.id).await.unwrap(), draft);
    }
}
