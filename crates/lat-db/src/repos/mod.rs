//! Repository modules implementing queries and mutations for all Latitude entities.
//!
//! Each module adds methods to `LatService` via `impl LatService` blocks.

pub mod commit;
pub mod document;
pub mod evaluation;
pub mod log;
pub mod project;
pub mod usage;
pub mod workspace;
