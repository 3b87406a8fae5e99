use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named point in a project's document history.
///
/// `merged_at` is `None` while the commit is a draft. Once set it never
/// changes, and merged commits of a project are ordered by it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Commit {
    pub id: i64,
    pub uuid: String,
    pub project_id: i64,
    pub title: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Commit {
    #[must_use]
    pub const fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    #[must_use]
    pub const fn is_draft(&self) -> bool {
        self.merged_at.is_none()
    }
}
