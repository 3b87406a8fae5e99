//! Query-layer contracts consumed by the resolver and the metering engine.
//!
//! Implementations live outside this crate (`lat-db` provides the libSQL one).
//! Every method returns a `CoreError` on failure; storage errors are carried
//! as `CoreError::Store` with the underlying error as source.

use chrono::{DateTime, Utc};

use crate::entities::{Commit, DocumentVersion};
use crate::errors::CoreError;

/// Read access to commits and document versions of a project.
#[allow(async_fn_in_trait)]
pub trait VersionStore {
    /// Find a commit by UUID inside a project.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the project has no such commit.
    async fn find_commit(&self, project_id: i64, commit_uuid: &str) -> Result<Commit, CoreError>;

    /// Latest merged version of every document in the project.
    ///
    /// Only commits with `merged_at <= as_of` are considered when `as_of` is
    /// set; otherwise all merged commits are.
    async fn latest_merged_versions(
        &self,
        project_id: i64,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentVersion>, CoreError>;

    /// All versions owned by exactly this commit.
    async fn versions_in_commit(&self, commit_id: i64) -> Result<Vec<DocumentVersion>, CoreError>;

    /// Content of the version with `document_id` owned by `commit_id`.
    ///
    /// `Ok(None)` when no such row exists.
    async fn document_content(
        &self,
        commit_id: i64,
        document_id: i64,
    ) -> Result<Option<String>, CoreError>;
}

/// Counting access to the append-only billable event tables.
#[allow(async_fn_in_trait)]
pub trait UsageStore {
    /// Document logs across every project of the workspace created at or after `since`.
    async fn count_document_logs_since(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, CoreError>;

    /// Evaluation results of the workspace created at or after `since`.
    async fn count_evaluation_results_since(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, CoreError>;
}
