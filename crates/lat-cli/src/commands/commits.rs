use serde::Serialize;

use lat_core::entities::Commit;
use lat_db::repos::commit::CommitFilter;
use lat_db::service::LatService;

use crate::cli::{CommitsArgs, GlobalFlags, OutputFormat};
use crate::output::output;

#[derive(Debug, Serialize)]
struct CommitListResponse {
    commits: Vec<Commit>,
}

pub async fn run(
    args: &CommitsArgs,
    service: &LatService,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = CommitFilter {
        status: args.status.into(),
        page: args.page,
        page_size: args.page_size,
    };
    let commits = service
        .get_commits_by_project(args.workspace, args.project, &filter)
        .await?;

    match flags.format {
        OutputFormat::Json => output(&CommitListResponse { commits }, flags.format),
        OutputFormat::Table => output(&commits, flags.format),
    }
}
