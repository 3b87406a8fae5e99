//! Commit/version resolution.
//!
//! Answers "which document versions are live at this commit": the latest
//! merged version of every document up to the commit's merge time, with the
//! commit's own edits layered on top when it is still a draft.

use std::collections::HashSet;

use crate::entities::DocumentVersion;
use crate::errors::CoreError;
use crate::store::VersionStore;

/// Layer a draft's own versions over resolved merged history.
///
/// A draft version replaces the history entry with the same
/// `document_uuid`; untouched history entries are kept as-is. Deletions are
/// not represented: a document missing from the draft keeps its history
/// version.
#[must_use]
pub fn overlay_draft(
    history: Vec<DocumentVersion>,
    draft: Vec<DocumentVersion>,
) -> Vec<DocumentVersion> {
    let touched: HashSet<&str> = draft.iter().map(|d| d.document_uuid.as_str()).collect();
    let mut documents: Vec<DocumentVersion> = history
        .into_iter()
        .filter(|d| !touched.contains(d.document_uuid.as_str()))
        .collect();
    documents.extend(draft);
    documents
}

/// Resolve the documents of a project as they exist at `commit_uuid`.
///
/// For a merged commit this is the merged history up to its `merged_at`.
/// For a draft it is the full merged history overlaid with the draft's edits.
/// An empty project resolves to an empty list.
///
/// # Errors
///
/// Returns `CoreError::NotFound` if the commit does not belong to the project,
/// or whatever the store reports when a query fails.
pub async fn resolve_documents_at_commit<S: VersionStore>(
    store: &S,
    project_id: i64,
    commit_uuid: &str,
) -> Result<Vec<DocumentVersion>, CoreError> {
    let commit = store.find_commit(project_id, commit_uuid).await?;
    let history = store
        .latest_merged_versions(project_id, commit.merged_at)
        .await?;

    if commit.is_merged() {
        tracing::debug!(
            project_id,
            commit_uuid,
            documents = history.len(),
            "resolved merged commit"
        );
        return Ok(history);
    }

    let draft = store.versions_in_commit(commit.id).await?;
    tracing::debug!(
        project_id,
        commit_uuid,
        history = history.len(),
        draft = draft.len(),
        "resolved draft commit"
    );
    Ok(overlay_draft(history, draft))
}

/// Fetch the content of one exact `(commit, document)` pair.
///
/// No history resolution happens here: the document row must be owned by
/// the referenced commit itself.
///
/// # Errors
///
/// Returns `CoreError::NotFound` if the commit or the document row is missing.
pub async fn get_document<S: VersionStore>(
    store: &S,
    project_id: i64,
    commit_uuid: &str,
    document_id: i64,
) -> Result<String, CoreError> {
    let commit = store.find_commit(project_id, commit_uuid).await?;
    store
        .document_content(commit.id, document_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Document", document_id))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{MemoryStore, at};

    fn uuids_and_commits(docs: &[DocumentVersion]) -> Vec<(String, i64)> {
        let mut pairs: Vec<_> = docs
            .iter()
            .map(|d| (d.document_uuid.clone(), d.commit_id))
            .collect();
        pairs.sort();
        pairs
    }

    /// c1 creates a+b, c2 edits a, c3 edits b. All merged.
    fn merged_history() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.commit(1, "c1", Some(at(2024, 1, 1)));
        store.commit(2, "c2", Some(at(2024, 2, 1)));
        store.commit(3, "c3", Some(at(2024, 3, 1)));
        store.version(10, "a", 1, "a v1");
        store.version(11, "b", 1, "b v1");
        store.version(12, "a", 2, "a v2");
        store.version(13, "b", 3, "b v3");
        store
    }

    #[tokio::test]
    async fn latest_merged_commit_returns_one_version_per_document() {
        let store = merged_history();
        let docs = resolve_documents_at_commit(&store, 1, "c3").await.unwrap();
        assert_eq!(
            uuids_and_commits(&docs),
            vec![("a".to_string(), 2), ("b".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn older_merged_commit_ignores_later_merges() {
        let store = merged_history();
        let docs = resolve_documents_at_commit(&store, 1, "c2").await.unwrap();
        assert_eq!(
            uuids_and_commits(&docs),
            vec![("a".to_string(), 2), ("b".to_string(), 1)]
        );

        let docs = resolve_documents_at_commit(&store, 1, "c1").await.unwrap();
        assert_eq!(
            uuids_and_commits(&docs),
            vec![("a".to_string(), 1), ("b".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn draft_replaces_only_the_documents_it_touches() {
        let mut store = merged_history();
        store.commit(4, "draft", None);
        store.version(14, "a", 4, "a draft");
        store.version(15, "c", 4, "c new");

        let docs = resolve_documents_at_commit(&store, 1, "draft").await.unwrap();
        assert_eq!(
            uuids_and_commits(&docs),
            vec![
                ("a".to_string(), 4),
                ("b".to_string(), 3),
                ("c".to_string(), 4)
            ]
        );
        let a = docs.iter().find(|d| d.document_uuid == "a").unwrap();
        assert_eq!(a.content, "a draft");
    }

    #[tokio::test]
    async fn draft_without_merged_history_returns_draft_documents() {
        let mut store = MemoryStore::default();
        store.commit(1, "draft", None);
        store.version(10, "a", 1, "only");

        let docs = resolve_documents_at_commit(&store, 1, "draft").await.unwrap();
        assert_eq!(uuids_and_commits(&docs), vec![("a".to_string(), 1)]);
    }

    #[tokio::test]
    async fn empty_project_resolves_to_empty_list() {
        let mut store = MemoryStore::default();
        store.commit(1, "c1", Some(at(2024, 1, 1)));
        let docs = resolve_documents_at_commit(&store, 1, "c1").await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn unknown_commit_is_not_found() {
        let store = merged_history();
        let err = resolve_documents_at_commit(&store, 1, "missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = MemoryStore {
            fail: true,
            ..merged_history()
        };
        let err = resolve_documents_at_commit(&store, 1, "c3")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
    }

    #[tokio::test]
    async fn get_document_reads_exact_commit_row() {
        let store = merged_history();
        let content = get_document(&store, 1, "c2", 12).await.unwrap();
        assert_eq!(content, "a v2");

        // Row 10 belongs to c1: no history resolution for exact fetches.
        let err = get_document(&store, 1, "c2", 10).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Document not found: 10");
    }

    #[test]
    fn overlay_keeps_history_when_draft_is_empty() {
        let store = merged_history();
        let history = store.versions.clone();
        let merged = overlay_draft(history.clone(), Vec::new());
        assert_eq!(merged, history);
    }
}
