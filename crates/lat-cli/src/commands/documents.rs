use serde::Serialize;

use lat_core::entities::DocumentVersion;
use lat_db::service::LatService;

use crate::cli::{DocumentsArgs, GlobalFlags, OutputFormat};
use crate::output::output;

#[derive(Debug, Serialize)]
struct DocumentRow {
    id: i64,
    document_uuid: String,
    path: String,
    commit_id: i64,
    updated_at: String,
}

impl From<DocumentVersion> for DocumentRow {
    fn from(version: DocumentVersion) -> Self {
        Self {
            id: version.id,
            document_uuid: version.document_uuid,
            path: version.path,
            commit_id: version.commit_id,
            updated_at: version.updated_at.to_rfc3339(),
        }
    }
}

pub async fn run(
    args: &DocumentsArgs,
    service: &LatService,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut documents = service
        .documents_at_commit(args.project, &args.commit)
        .await?;
    documents.sort_by(|a, b| a.path.cmp(&b.path));

    match flags.format {
        OutputFormat::Json => output(&documents, flags.format),
        OutputFormat::Table => {
            let rows: Vec<DocumentRow> = documents.into_iter().map(DocumentRow::from).collect();
            output(&rows, flags.format)
        }
    }
}
