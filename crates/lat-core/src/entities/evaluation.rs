use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A workspace-scoped scorer run against document logs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Evaluation {
    pub id: i64,
    pub uuid: String,
    pub workspace_id: i64,
    pub name: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

/// A scored outcome of one evaluation over one document log. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EvaluationResult {
    pub id: i64,
    pub uuid: String,
    pub evaluation_id: i64,
    pub document_log_id: i64,
    pub result: String,
    pub created_at: DateTime<Utc>,
}
