use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A prompt project. Belongs to exactly one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Set when the project is destroyed. Destroyed projects are hidden from
    /// workspace-scoped lookups.
    pub deleted_at: Option<DateTime<Utc>>,
}
