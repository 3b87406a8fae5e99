use clap::{Args, Parser, Subcommand, ValueEnum};

use lat_core::enums::CommitStatus;

/// Top-level CLI parser for the `latctl` binary.
#[derive(Debug, Parser)]
#[command(name = "latctl", version, about = "Latitude - prompt versions and usage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides `database.path` from config)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            db: self.db.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub db: Option<String>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Documents of a project as they exist at a commit.
    Documents(DocumentsArgs),
    /// Content of one document version at a commit.
    Document(DocumentArgs),
    /// Commits of a project.
    Commits(CommitsArgs),
    /// Billable usage of a workspace in its current billing cycle.
    Usage(UsageArgs),
}

#[derive(Clone, Debug, Args)]
pub struct DocumentsArgs {
    /// Project ID
    #[arg(long)]
    pub project: i64,
    /// Commit UUID
    #[arg(long)]
    pub commit: String,
}

#[derive(Clone, Debug, Args)]
pub struct DocumentArgs {
    /// Project ID
    #[arg(long)]
    pub project: i64,
    /// Commit UUID
    #[arg(long)]
    pub commit: String,
    /// Document version ID
    #[arg(long)]
    pub id: i64,
}

#[derive(Clone, Debug, Args)]
pub struct CommitsArgs {
    /// Workspace ID
    #[arg(long)]
    pub workspace: i64,
    /// Project ID
    #[arg(long)]
    pub project: i64,
    #[arg(long, default_value = "all")]
    pub status: StatusArg,
    /// 1-based page number
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct UsageArgs {
    /// Workspace ID
    #[arg(long)]
    pub workspace: i64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    All,
    Merged,
    Draft,
}

impl From<StatusArg> for CommitStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => Self::All,
            StatusArg::Merged => Self::Merged,
            StatusArg::Draft => Self::Draft,
        }
    }
}
