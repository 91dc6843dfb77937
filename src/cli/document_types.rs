use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::document_types::{DocumentTypeChangeset, NewDocumentType};
use crate::api::ApiClient;
use crate::models::{DocumentType, ResourceKind};

use super::output::Output;
use super::resolve_arg;

#[derive(Debug, Args)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub command: TypesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    /// List all document types
    List,
    /// Show document type details
    Get {
        /// Document type ID or name
        document_type: String,
    },
    /// Create a document type
    Create { name: String },
    /// Rename a document type
    Edit {
        document_type: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a document type
    Delete {
        document_type: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct DocumentTypeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DOCUMENTS")]
    documents: i64,
}

pub async fn execute(args: &TypesArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        TypesCommand::List => {
            let types = client.list_document_types().await?;
            if output.is_json() {
                return output.json(&types);
            }
            let rows: Vec<_> = types
                .iter()
                .map(|document_type: &DocumentType| DocumentTypeRow {
                    id: document_type.id,
                    name: document_type.name.clone(),
                    documents: document_type.document_count,
                })
                .collect();
            output.table(&rows, "No document types found");
        }
        TypesCommand::Get { document_type } => {
            let id = resolve_arg(client, ResourceKind::DocumentType, document_type).await?;
            let document_type = client.get_document_type(id).await?;
            if output.is_json() {
                return output.json(&document_type);
            }
            output.fields(&[
                ("ID", document_type.id.to_string()),
                ("Name", document_type.name.clone()),
                ("Slug", document_type.slug.clone()),
                ("Documents", document_type.document_count.to_string()),
            ]);
        }
        TypesCommand::Create { name } => {
            let document_type = client
                .create_document_type(&NewDocumentType { name: name.clone() })
                .await?;
            if output.is_json() {
                return output.json(&document_type);
            }
            output.success(&format!(
                "Created document type {}: {}",
                document_type.id, document_type.name
            ));
        }
        TypesCommand::Edit {
            document_type,
            name,
        } => {
            let Some(name) = name.clone().filter(|name| !name.is_empty()) else {
                bail!("no changes specified");
            };
            let id = resolve_arg(client, ResourceKind::DocumentType, document_type).await?;
            let updated = client
                .update_document_type(id, &DocumentTypeChangeset { name: Some(name) })
                .await?;
            if output.is_json() {
                return output.json(&updated);
            }
            output.success(&format!("Updated document type {id}"));
        }
        TypesCommand::Delete {
            document_type,
            force,
        } => {
            let id = resolve_arg(client, ResourceKind::DocumentType, document_type).await?;
            if !force && !output.confirm(&format!("Delete document type {id}?"))? {
                println!("Cancelled");
                return Ok(());
            }
            client.delete_document_type(id).await?;
            output.success(&format!("Deleted document type {id}"));
        }
    }
    Ok(())
}
