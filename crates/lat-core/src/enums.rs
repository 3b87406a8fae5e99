//! Status filters and entity types for Latitude.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CommitStatus
// ---------------------------------------------------------------------------

/// Filter for commit listings.
///
/// A commit is `merged` once `merged_at` is set and a `draft` until then.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    #[default]
    All,
    Merged,
    Draft,
}

impl CommitStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Merged => "merged",
            Self::Draft => "draft",
        }
    }
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Every persisted entity kind. Used in error messages and table mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Workspace,
    Project,
    Commit,
    DocumentVersion,
    DocumentLog,
    Evaluation,
    EvaluationResult,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Project => "project",
            Self::Commit => "commit",
            Self::DocumentVersion => "document_version",
            Self::DocumentLog => "document_log",
            Self::Evaluation => "evaluation",
            Self::EvaluationResult => "evaluation_result",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
