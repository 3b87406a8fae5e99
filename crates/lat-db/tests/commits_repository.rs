//! Commit listing integration tests: status filters and pagination.

use pretty_assertions::assert_eq;

use lat_core::enums::CommitStatus;
use lat_db::repos::commit::CommitFilter;
use lat_db::service::LatService;

async fn test_service() -> LatService {
    LatService::new_local(":memory:").await.unwrap()
}

/// Workspace + project with 10 drafts on top of the initial commit, 2 of them merged.
async fn seeded() -> (LatService, i64, i64) {
    let svc = test_service().await;
    let ws = svc.create_workspace("acme", None).await.unwrap();
    let (project, _) = svc.create_project(ws.id, "bot").await.unwrap();

    let mut drafts = Vec::new();
    for i in 0..10 {
        drafts.push(svc.create_draft(project.id, &format!("draft {i}")).await.unwrap());
    }
    for draft in &drafts[..2] {
        svc.merge_commit(draft.id).await.unwrap();
    }
    (svc, ws.id, project.id)
}

fn filter(status: CommitStatus) -> CommitFilter {
    CommitFilter {
        status,
        ..CommitFilter::default()
    }
}

// ---------------------------------------------------------------------------
// Status filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_commits_includes_initial_version() {
    let (svc, ws, project) = seeded().await;
    let commits = svc
        .get_commits_by_project(ws, project, &filter(CommitStatus::All))
        .await
        .unwrap();
    assert_eq!(commits.len(), 11);
    assert_eq!(commits[0].title, "Initial version");
}

#[tokio::test]
async fn merged_commits_only() {
    let (svc, ws, project) = seeded().await;
    let commits = svc
        .get_commits_by_project(ws, project, &filter(CommitStatus::Merged))
        .await
        .unwrap();
    assert_eq!(commits.len(), 3);
    assert!(commits.iter().all(|c| c.is_merged()));
}

#[tokio::test]
async fn draft_commits_only() {
    let (svc, ws, project) = seeded().await;
    let commits = svc
        .get_commits_by_project(ws, project, &filter(CommitStatus::Draft))
        .await
        .unwrap();
    assert_eq!(commits.len(), 8);
    assert!(commits.iter().all(|c| c.is_draft()));
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_pages() {
    let (svc, ws, project) = seeded().await;
    let page = |page| CommitFilter {
        status: CommitStatus::Draft,
        page: Some(page),
        page_size: Some(5),
    };

    let first = svc.get_commits_by_project(ws, project, &page(1)).await.unwrap();
    let second = svc.get_commits_by_project(ws, project, &page(2)).await.unwrap();
    let third = svc.get_commits_by_project(ws, project, &page(3)).await.unwrap();

    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 3);
    assert!(third.is_empty());
    assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));
}

#[tokio::test]
async fn page_without_size_uses_default() {
    let (svc, ws, project) = seeded().await;
    let commits = svc
        .get_commits_by_project(
            ws,
            project,
            &CommitFilter {
                page: Some(1),
                ..CommitFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(svc.default_page_size(), 20);
    assert_eq!(commits.len(), 11);
}

// ---------------------------------------------------------------------------
// Scoping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn other_workspace_cannot_list() {
    let (svc, _, project) = seeded().await;
    let intruder = svc.create_workspace("intruder", None).await.unwrap();
    let err = svc
        .get_commits_by_project(intruder.id, project, &CommitFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, lat_db::error::DatabaseError::NotFound { .. }));
}

#[tokio::test]
async fn destroyed_project_cannot_list() {
    let (svc, ws, project) = seeded().await;
    svc.destroy_project(ws, project).await.unwrap();
    assert!(
        svc.get_commits_by_project(ws, project, &CommitFilter::default())
            .await
            .is_err()
    );
}
