use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Execution record of a document at a commit. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DocumentLog {
    pub id: i64,
    pub uuid: String,
    pub document_uuid: String,
    pub commit_id: i64,
    pub parameters: serde_json::Value,
    pub resolved_content: String,
    pub custom_identifier: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a document execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewDocumentLog {
    pub document_uuid: String,
    pub parameters: serde_json::Value,
    pub resolved_content: String,
    pub custom_identifier: Option<String>,
    pub duration_ms: i64,
    /// Defaults to the insertion time.
    pub created_at: Option<DateTime<Utc>>,
}
