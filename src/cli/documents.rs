use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::json;
use tabled::Tabled;
use tracing::info;

use crate::api::documents::{DocumentChangeset, DocumentFilter, UploadRequest};
use crate::api::ApiClient;
use crate::batch::run_batch;
use crate::models::{Document, ResourceKind};
use crate::pagination::PageRequest;
use crate::reconcile::TagEdit;

use super::output::{optional_id, truncate, Output};
use super::{resolve_arg, resolve_clearable};

const DEFAULT_ORDERING: &str = "-created";

#[derive(Debug, Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: DocumentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List documents with optional filters
    List(ListArgs),
    /// Full-text search across all documents
    Search {
        query: String,
        /// Max results
        #[arg(long, default_value_t = 25)]
        limit: u32,
    },
    /// Show document details
    Get {
        /// Document ID or exact title
        document: String,
    },
    /// Print the extracted text of a document
    Content { document: String },
    /// List documents similar to the given one
    Similar {
        document: String,
        /// Max results
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Upload one or more files for ingestion
    Upload(UploadArgs),
    /// Download a document file
    Download {
        document: String,
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Download the original instead of the archived version
        #[arg(long)]
        original: bool,
    },
    /// Save the thumbnail image of a document
    Thumb {
        document: String,
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save the preview rendition of a document
    Preview {
        document: String,
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Edit document metadata
    Edit(EditArgs),
    /// Delete one or more documents
    Delete {
        #[arg(required = true)]
        documents: Vec<String>,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Full-text query
    #[arg(long)]
    pub query: Option<String>,
    /// Filter by tag name (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Filter by correspondent name
    #[arg(long)]
    pub correspondent: Option<String>,
    /// Filter by document type name
    #[arg(long = "type")]
    pub document_type: Option<String>,
    /// Only documents created after this date (YYYY-MM-DD)
    #[arg(long)]
    pub created_after: Option<NaiveDate>,
    /// Only documents created before this date (YYYY-MM-DD)
    #[arg(long)]
    pub created_before: Option<NaiveDate>,
    /// Max results
    #[arg(long, default_value_t = 25)]
    pub limit: u32,
    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Document title (defaults to the file name without extension)
    #[arg(long)]
    pub title: Option<String>,
    /// Correspondent name or ID
    #[arg(long)]
    pub correspondent: Option<String>,
    /// Document type name or ID
    #[arg(long = "type")]
    pub document_type: Option<String>,
    /// Tag name or ID (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub document: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// Correspondent name or ID, `-` to clear
    #[arg(long)]
    pub correspondent: Option<String>,
    /// Document type name or ID, `-` to clear
    #[arg(long = "type")]
    pub document_type: Option<String>,
    /// Storage path name or ID, `-` to clear
    #[arg(long)]
    pub storage_path: Option<String>,
    /// Add a tag (repeatable)
    #[arg(long = "add-tag")]
    pub add_tags: Vec<String>,
    /// Remove a tag (repeatable)
    #[arg(long = "remove-tag")]
    pub remove_tags: Vec<String>,
    /// Archive serial number
    #[arg(long)]
    pub asn: Option<i64>,
}

impl EditArgs {
    fn has_changes(&self) -> bool {
        self.title.as_deref().is_some_and(|title| !title.is_empty())
            || self.correspondent.is_some()
            || self.document_type.is_some()
            || self.storage_path.is_some()
            || !self.add_tags.is_empty()
            || !self.remove_tags.is_empty()
            || self.asn.is_some_and(|asn| asn > 0)
    }
}

#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "TAGS")]
    tags: String,
}

impl DocumentRow {
    fn new(doc: &Document, title_width: usize) -> Self {
        Self {
            id: doc.id,
            title: truncate(&doc.title, title_width),
            created: doc.created_display(),
            tags: format!("{} tags", doc.tags.len()),
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadedFile {
    file: String,
    task_id: String,
}

pub async fn execute(args: &DocumentsArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        DocumentsCommand::List(list) => list_documents(list, client, output).await,
        DocumentsCommand::Search { query, limit } => {
            let filter = DocumentFilter {
                query: Some(query.clone()),
                ordering: Some(DEFAULT_ORDERING.to_string()),
                page: PageRequest::size(*limit),
                ..Default::default()
            };
            let page = client.list_documents(&filter).await?;
            if output.is_json() {
                return output.json(&page);
            }
            let rows: Vec<_> = page.results.iter().map(|doc| DocumentRow::new(doc, 50)).collect();
            output.table(&rows, "No documents found");
            output.info(&format!("\nFound {} documents", page.count));
            Ok(())
        }
        DocumentsCommand::Get { document } => {
            let id = resolve_arg(client, ResourceKind::Document, document).await?;
            let doc = client.get_document(id).await?;
            if output.is_json() {
                return output.json(&doc);
            }
            print_document(&doc, output);
            Ok(())
        }
        DocumentsCommand::Content { document } => {
            let id = resolve_arg(client, ResourceKind::Document, document).await?;
            let content = client.document_content(id).await?;
            if output.is_json() {
                return output.json(&json!({ "id": id, "content": content }));
            }
            println!("{content}");
            Ok(())
        }
        DocumentsCommand::Similar { document, limit } => {
            let id = resolve_arg(client, ResourceKind::Document, document).await?;
            let page = client.similar_documents(id, Some(*limit)).await?;
            if output.is_json() {
                return output.json(&page);
            }
            let rows: Vec<_> = page.results.iter().map(|doc| DocumentRow::new(doc, 50)).collect();
            output.table(&rows, "No similar documents found");
            Ok(())
        }
        DocumentsCommand::Upload(upload) => upload_documents(upload, client, output).await,
        DocumentsCommand::Download {
            document,
            output: path,
            original,
        } => {
            let id = resolve_arg(client, ResourceKind::Document, document).await?;
            let file = client.download_document(id, *original).await?;
            let target = path
                .clone()
                .unwrap_or_else(|| PathBuf::from(file.filename_or(&format!("document_{id}.pdf"))));
            write_file(&target, &file.bytes).await?;
            output.success(&format!(
                "Downloaded to {} ({} bytes)",
                target.display(),
                file.bytes.len()
            ));
            Ok(())
        }
        DocumentsCommand::Thumb {
            document,
            output: path,
        } => {
            let id = resolve_arg(client, ResourceKind::Document, document).await?;
            let bytes = client.document_thumbnail(id).await?;
            let target = path
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("document_{id}_thumb.webp")));
            write_file(&target, &bytes).await?;
            output.success(&format!("Saved thumbnail to {} ({} bytes)", target.display(), bytes.len()));
            Ok(())
        }
        DocumentsCommand::Preview {
            document,
            output: path,
        } => {
            let id = resolve_arg(client, ResourceKind::Document, document).await?;
            let bytes = client.document_preview(id).await?;
            let target = path
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("document_{id}_preview.pdf")));
            write_file(&target, &bytes).await?;
            output.success(&format!("Saved preview to {} ({} bytes)", target.display(), bytes.len()));
            Ok(())
        }
        DocumentsCommand::Edit(edit) => edit_document(edit, client, output).await,
        DocumentsCommand::Delete { documents, force } => {
            delete_documents(documents, *force, client, output).await
        }
    }
}

async fn list_documents(args: &ListArgs, client: &ApiClient, output: &Output) -> Result<()> {
    let filter = DocumentFilter {
        query: args.query.clone(),
        tags: args.tags.clone(),
        correspondent: args.correspondent.clone(),
        document_type: args.document_type.clone(),
        created_after: args.created_after,
        created_before: args.created_before,
        ordering: Some(DEFAULT_ORDERING.to_string()),
        page: PageRequest::new(args.page, args.limit),
        ..Default::default()
    };
    let page = client.list_documents(&filter).await?;

    if output.is_json() {
        return output.json(&page);
    }
    if page.is_empty() {
        println!("No documents found");
        return Ok(());
    }

    let rows: Vec<_> = page.results.iter().map(|doc| DocumentRow::new(doc, 40)).collect();
    output.table(&rows, "No documents found");
    output.info(&format!("\nShowing {} of {} documents", page.len(), page.count));
    Ok(())
}

fn print_document(doc: &Document, output: &Output) {
    let timestamp = |value: Option<chrono::DateTime<chrono::FixedOffset>>| {
        value
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    };

    let mut fields = vec![
        ("ID", doc.id.to_string()),
        ("Title", doc.title.clone()),
        ("Created", doc.created_display()),
        ("Added", timestamp(doc.added)),
        ("Modified", timestamp(doc.modified)),
        ("Original", doc.original_file_name.clone().unwrap_or_default()),
    ];
    if let Some(asn) = doc.archive_serial_number {
        fields.push(("ASN", asn.to_string()));
    }
    if doc.correspondent.is_some() {
        fields.push(("Correspondent", optional_id(doc.correspondent)));
    }
    if doc.document_type.is_some() {
        fields.push(("Type", optional_id(doc.document_type)));
    }
    if doc.storage_path.is_some() {
        fields.push(("Storage path", optional_id(doc.storage_path)));
    }
    if !doc.tags.is_empty() {
        let tags: Vec<String> = doc.tags.iter().map(i64::to_string).collect();
        fields.push(("Tags", tags.join(", ")));
    }
    output.fields(&fields);
}

async fn upload_documents(args: &UploadArgs, client: &ApiClient, output: &Output) -> Result<()> {
    for file in &args.files {
        if !tokio::fs::try_exists(file).await.unwrap_or(false) {
            bail!("file not found: {}", file.display());
        }
    }

    let correspondent = match &args.correspondent {
        Some(token) => Some(resolve_arg(client, ResourceKind::Correspondent, token).await?),
        None => None,
    };
    let document_type = match &args.document_type {
        Some(token) => Some(resolve_arg(client, ResourceKind::DocumentType, token).await?),
        None => None,
    };
    let mut tags = Vec::with_capacity(args.tags.len());
    for token in &args.tags {
        tags.push(resolve_arg(client, ResourceKind::Tag, token).await?);
    }

    let report = run_batch(args.files.clone(), move |path| {
        let request = UploadRequest {
            title: Some(args.title.clone().unwrap_or_else(|| file_stem(&path))),
            correspondent,
            document_type,
            tags: tags.clone(),
            path: path.clone(),
        };
        output.info(&format!("Uploading {}...", file_name(&path)));
        client.upload_document(request)
    })
    .await;
    info!(
        uploaded = report.completed.len(),
        skipped = report.skipped.len(),
        "upload batch finished"
    );

    let uploaded: Vec<UploadedFile> = report
        .completed
        .iter()
        .map(|(path, task_id)| UploadedFile {
            file: path.display().to_string(),
            task_id: task_id.clone(),
        })
        .collect();

    if output.is_json() {
        output.json(&uploaded)?;
    } else {
        for entry in &uploaded {
            output.success(&format!(
                "Uploaded {} (task: {})",
                file_name(Path::new(&entry.file)),
                entry.task_id
            ));
        }
    }

    if let Some((path, err)) = report.failed {
        if !report.skipped.is_empty() {
            output.info(&format!("Skipped {} remaining file(s)", report.skipped.len()));
        }
        return Err(err).with_context(|| format!("upload failed for {}", path.display()));
    }
    Ok(())
}

async fn edit_document(args: &EditArgs, client: &ApiClient, output: &Output) -> Result<()> {
    if !args.has_changes() {
        bail!("no changes specified");
    }

    let id = resolve_arg(client, ResourceKind::Document, &args.document).await?;
    let mut changes = DocumentChangeset {
        title: args.title.clone().filter(|title| !title.is_empty()),
        correspondent: resolve_clearable(
            client,
            ResourceKind::Correspondent,
            args.correspondent.as_deref(),
        )
        .await?,
        document_type: resolve_clearable(
            client,
            ResourceKind::DocumentType,
            args.document_type.as_deref(),
        )
        .await?,
        storage_path: resolve_clearable(
            client,
            ResourceKind::StoragePath,
            args.storage_path.as_deref(),
        )
        .await?,
        archive_serial_number: args.asn.filter(|asn| *asn > 0),
        tags: None,
    };

    let tag_edit = TagEdit {
        add: args.add_tags.clone(),
        remove: args.remove_tags.clone(),
    };
    if !tag_edit.is_empty() {
        let current = client.get_document(id).await?;
        let tags = tag_edit.apply(client, &current.tag_set()).await?;
        changes.tags = Some(tags.into_iter().collect());
    }

    let updated = client.update_document(id, &changes).await?;
    if output.is_json() {
        return output.json(&updated);
    }
    output.success(&format!("Updated document {id}"));
    Ok(())
}

async fn delete_documents(
    references: &[String],
    force: bool,
    client: &ApiClient,
    output: &Output,
) -> Result<()> {
    let mut ids = Vec::with_capacity(references.len());
    for reference in references {
        ids.push(resolve_arg(client, ResourceKind::Document, reference).await?);
    }

    if !force && !output.confirm(&format!("Delete {} document(s)?", ids.len()))? {
        println!("Cancelled");
        return Ok(());
    }

    let report = run_batch(ids, |id| client.delete_document(id)).await;
    for (id, _) in &report.completed {
        output.success(&format!("Deleted document {id}"));
    }
    if let Some((id, err)) = report.failed {
        if !report.skipped.is_empty() {
            output.info(&format!("Skipped {} remaining document(s)", report.skipped.len()));
        }
        return Err(err).with_context(|| format!("failed to delete document {id}"));
    }
    Ok(())
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
