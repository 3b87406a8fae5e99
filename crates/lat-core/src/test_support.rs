//! In-memory store used by unit tests of the resolver and the metering engine.

use chrono::{DateTime, TimeZone, Utc};

use crate::entities::{Commit, DocumentVersion};
use crate::errors::CoreError;
use crate::store::{UsageStore, VersionStore};

/// Midnight UTC on the given date.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Every commit lives in project 1 unless pushed directly.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub commits: Vec<Commit>,
    pub versions: Vec<DocumentVersion>,
    /// `(workspace_id, created_at)` of each document log.
    pub logs: Vec<(i64, DateTime<Utc>)>,
    /// `(workspace_id, created_at)` of each evaluation result.
    pub results: Vec<(i64, DateTime<Utc>)>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn commit(&mut self, id: i64, uuid: &str, merged_at: Option<DateTime<Utc>>) {
        self.commits.push(Commit {
            id,
            uuid: uuid.to_string(),
            project_id: 1,
            title: uuid.to_string(),
            merged_at,
            created_at: at(2020, 1, 1),
        });
    }

    pub fn version(&mut self, id: i64, document_uuid: &str, commit_id: i64, content: &str) {
        self.versions.push(DocumentVersion {
            id,
            document_uuid: document_uuid.to_string(),
            commit_id,
            path: format!("{document_uuid}.md"),
            content: content.to_string(),
            created_at: at(2020, 1, 1),
            updated_at: at(2020, 1, 1),
        });
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::Store(Box::new(std::io::Error::other(
                "connection refused",
            ))));
        }
        Ok(())
    }

    fn merged_at(&self, commit_id: i64) -> Option<DateTime<Utc>> {
        self.commits
            .iter()
            .find(|c| c.id == commit_id)
            .and_then(|c| c.merged_at)
    }
}

impl VersionStore for MemoryStore {
    async fn find_commit(&self, project_id: i64, commit_uuid: &str) -> Result<Commit, CoreError> {
        self.check()?;
        self.commits
            .iter()
            .find(|c| c.project_id == project_id && c.uuid == commit_uuid)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Commit", commit_uuid))
    }

    async fn latest_merged_versions(
        &self,
        _project_id: i64,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentVersion>, CoreError> {
        self.check()?;
        let mut latest: Vec<(DateTime<Utc>, DocumentVersion)> = Vec::new();
        for version in &self.versions {
            let Some(merged_at) = self.merged_at(version.commit_id) else {
                continue;
            };
            if as_of.is_some_and(|cutoff| merged_at > cutoff) {
                continue;
            }
            match latest
                .iter_mut()
                .find(|(_, v)| v.document_uuid == version.document_uuid)
            {
                Some(entry) if entry.0 < merged_at => *entry = (merged_at, version.clone()),
                Some(_) => {}
                None => latest.push((merged_at, version.clone())),
            }
        }
        Ok(latest.into_iter().map(|(_, v)| v).collect())
    }

    async fn versions_in_commit(&self, commit_id: i64) -> Result<Vec<DocumentVersion>, CoreError> {
        self.check()?;
        Ok(self
            .versions
            .iter()
            .filter(|v| v.commit_id == commit_id)
            .cloned()
            .collect())
    }

    async fn document_content(
        &self,
        commit_id: i64,
        document_id: i64,
    ) -> Result<Option<String>, CoreError> {
        self.check()?;
        Ok(self
            .versions
            .iter()
            .find(|v| v.commit_id == commit_id && v.id == document_id)
            .map(|v| v.content.clone()))
    }
}

impl UsageStore for MemoryStore {
    async fn count_document_logs_since(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        self.check()?;
        Ok(self
            .logs
            .iter()
            .filter(|(ws, created_at)| *ws == workspace_id && *created_at >= since)
            .count() as u64)
    }

    async fn count_evaluation_results_since(
        &self,
        workspace_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        self.check()?;
        Ok(self
            .results
            .iter()
            .filter(|(ws, created_at)| *ws == workspace_id && *created_at >= since)
            .count() as u64)
    }
}
