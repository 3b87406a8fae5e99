use lat_db::service::LatService;

use crate::cli::{Commands, GlobalFlags};

pub mod commits;
pub mod document;
pub mod documents;
pub mod usage;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(
    command: &Commands,
    service: &LatService,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Documents(args) => documents::run(args, service, flags).await,
        Commands::Document(args) => document::run(args, service, flags).await,
        Commands::Commits(args) => commits::run(args, service, flags).await,
        Commands::Usage(args) => usage::run(args, service, flags).await,
    }
}
