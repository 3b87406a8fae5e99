//! # lat-core
//!
//! Core types and read-side logic for Latitude.
//!
//! This crate provides the foundational types shared across all Latitude crates:
//! - Entity structs for workspaces, projects, commits, document versions,
//!   document logs and evaluation results
//! - Commit status filter enum
//! - Cross-cutting error types
//! - Store traits describing what the query layer must provide
//! - Commit/version resolution (merged history flattening + draft overlay)
//! - Billing-cycle arithmetic and workspace usage metering

pub mod billing;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod resolve;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
