//! Entity structs for all Latitude domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `lat-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema validation.

mod commit;
mod document;
mod evaluation;
mod log;
mod project;
mod workspace;

pub use commit::Commit;
pub use document::DocumentVersion;
pub use evaluation::{Evaluation, EvaluationResult};
pub use log::{DocumentLog, NewDocumentLog};
pub use project::Project;
pub use workspace::Workspace;
