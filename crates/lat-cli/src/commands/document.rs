use serde::Serialize;

use lat_db::service::LatService;

use crate::cli::{DocumentArgs, GlobalFlags};
use crate::output::output;

#[derive(Debug, Serialize)]
struct DocumentContentResponse<'a> {
    id: i64,
    commit: &'a str,
    content: String,
}

pub async fn run(
    args: &DocumentArgs,
    service: &LatService,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let content = service
        .get_document(args.project, &args.commit, args.id)
        .await?;
    output(
        &DocumentContentResponse {
            id: args.id,
            commit: &args.commit,
            content,
        },
        flags.format,
    )
}
