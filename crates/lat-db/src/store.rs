//! libSQL implementation of the lat-core store traits.

use chrono::{DateTime, Utc};

use lat_core::entities::{Commit, DocumentVersion};
use lat_core::errors::CoreError;
use lat_core::store::{UsageStore, VersionStore};

use crate::service::LatService;

impl VersionStore for LatService {
    async fn find_commit(&self, project_id: i64, commit_uuid: &str) -> Result<Commit, CoreError> {
        Ok(self.get_commit_by_uuid(project_id, commit_uuid).await?)
    }

    async fn latest_merged_versions(
        &self,
        project_id: i64,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentVersion>, CoreError> {
        Ok(self.list_latest_merged_versions(project_id, as_of).await?)
    }

    async fn versions_in_commit(&self, commit_id: i64) -> Result<Vec<DocumentVersion>, CoreError> {
        Ok(self.list_versions_in_commit(commit_id).await?)
    }

    async fn document_content(
        &self,
        commit_id: i64,
        document_id: i64,
    ) -> Result<Option<String>, CoreError> {
        Ok(self.get_document_content(commit_id, document_id).await?)
    }
}

impl UsageStore for LatService {
    async fn count_document_logs_since(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        Ok(self.count_document_logs(workspace_id, since).await?)
    }

    async fn count_evaluation_results_since(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        Ok(self.count_evaluation_results(workspace_id, since).await?)
    }
}
