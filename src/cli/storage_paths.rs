use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::storage_paths::NewStoragePath;
use crate::api::ApiClient;
use crate::models::{ResourceKind, StoragePath};

use super::output::{truncate, Output};
use super::resolve_arg;

#[derive(Debug, Args)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub command: StorageCommand,
}

#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// List all storage paths
    List,
    /// Show storage path details
    Get {
        /// Storage path ID or name
        storage_path: String,
    },
    /// Create a storage path from a path template
    Create {
        name: String,
        /// Path template, e.g. {created_year}/{correspondent}/{title}
        path: String,
    },
    /// Delete a storage path
    Delete {
        storage_path: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct StoragePathRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PATH")]
    path: String,
    #[tabled(rename = "DOCUMENTS")]
    documents: i64,
}

impl From<&StoragePath> for StoragePathRow {
    fn from(storage_path: &StoragePath) -> Self {
        Self {
            id: storage_path.id,
            name: storage_path.name.clone(),
            path: truncate(&storage_path.path, 40),
            documents: storage_path.document_count,
        }
    }
}

pub async fn execute(args: &StorageArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        StorageCommand::List => {
            let paths = client.list_storage_paths().await?;
            if output.is_json() {
                return output.json(&paths);
            }
            let rows: Vec<StoragePathRow> = paths.iter().map(StoragePathRow::from).collect();
            output.table(&rows, "No storage paths found");
        }
        StorageCommand::Get { storage_path } => {
            let id = resolve_arg(client, ResourceKind::StoragePath, storage_path).await?;
            let storage_path = client.get_storage_path(id).await?;
            if output.is_json() {
                return output.json(&storage_path);
            }
            output.fields(&[
                ("ID", storage_path.id.to_string()),
                ("Name", storage_path.name.clone()),
                ("Path", storage_path.path.clone()),
                ("Slug", storage_path.slug.clone()),
                ("Documents", storage_path.document_count.to_string()),
            ]);
        }
        StorageCommand::Create { name, path } => {
            let storage_path = client
                .create_storage_path(&NewStoragePath {
                    name: name.clone(),
                    path: path.clone(),
                })
                .await?;
            if output.is_json() {
                return output.json(&storage_path);
            }
            output.success(&format!(
                "Created storage path {}: {}",
                storage_path.id, storage_path.name
            ));
        }
        StorageCommand::Delete {
            storage_path,
            force,
        } => {
            let id = resolve_arg(client, ResourceKind::StoragePath, storage_path).await?;
            if !force && !output.confirm(&format!("Delete storage path {id}?"))? {
                println!("Cancelled");
                return Ok(());
            }
            client.delete_storage_path(id).await?;
            output.success(&format!("Deleted storage path {id}"));
        }
    }
    Ok(())
}
