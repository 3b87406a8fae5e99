use serde::Serialize;

use lat_db::service::LatService;

use crate::cli::{GlobalFlags, UsageArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct UsageResponse {
    workspace_id: i64,
    usage: u64,
    since: chrono::DateTime<chrono::Utc>,
}

pub async fn run(args: &UsageArgs, service: &LatService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let usage = service.workspace_usage(args.workspace).await?;
    output(
        &UsageResponse {
            workspace_id: args.workspace,
            usage: usage.usage,
            since: usage.since,
        },
        flags.format,
    )
}
