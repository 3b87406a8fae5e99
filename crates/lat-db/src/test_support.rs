//! Shared test utilities for lat-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use lat_core::entities::{Commit, Project, Workspace};

    use crate::LatDb;
    use crate::service::LatService;

    /// Create an in-memory `LatService`.
    pub async fn test_service() -> LatService {
        let db = LatDb::open_local(":memory:").await.unwrap();
        LatService::from_db(db)
    }

    /// Create a workspace with one project; returns the project's initial commit too.
    pub async fn test_project(svc: &LatService) -> (Workspace, Project, Commit) {
        let workspace = svc.create_workspace("acme", None).await.unwrap();
        let (project, commit) = svc.create_project(workspace.id, "bot").await.unwrap();
        (workspace, project, commit)
    }
}
