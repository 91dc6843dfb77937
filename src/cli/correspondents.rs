use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::correspondents::{CorrespondentChangeset, NewCorrespondent};
use crate::api::ApiClient;
use crate::models::{Correspondent, ResourceKind};

use super::output::Output;
use super::resolve_arg;

#[derive(Debug, Args)]
pub struct CorrespondentsArgs {
    #[command(subcommand)]
    pub command: CorrespondentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CorrespondentsCommand {
    /// List all correspondents
    List,
    /// Show correspondent details
    Get {
        /// Correspondent ID or name
        correspondent: String,
    },
    /// Create a correspondent
    Create { name: String },
    /// Rename a correspondent
    Edit {
        correspondent: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a correspondent
    Delete {
        correspondent: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct CorrespondentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DOCUMENTS")]
    documents: i64,
    #[tabled(rename = "LAST CORRESPONDENCE")]
    last_correspondence: String,
}

impl From<&Correspondent> for CorrespondentRow {
    fn from(correspondent: &Correspondent) -> Self {
        Self {
            id: correspondent.id,
            name: correspondent.name.clone(),
            documents: correspondent.document_count,
            last_correspondence: correspondent
                .last_correspondence
                .as_deref()
                .map(|value| value.chars().take(10).collect())
                .unwrap_or_default(),
        }
    }
}

pub async fn execute(args: &CorrespondentsArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        CorrespondentsCommand::List => {
            let correspondents = client.list_correspondents().await?;
            if output.is_json() {
                return output.json(&correspondents);
            }
            let rows: Vec<CorrespondentRow> =
                correspondents.iter().map(CorrespondentRow::from).collect();
            output.table(&rows, "No correspondents found");
        }
        CorrespondentsCommand::Get { correspondent } => {
            let id = resolve_arg(client, ResourceKind::Correspondent, correspondent).await?;
            let correspondent = client.get_correspondent(id).await?;
            if output.is_json() {
                return output.json(&correspondent);
            }
            output.fields(&[
                ("ID", correspondent.id.to_string()),
                ("Name", correspondent.name.clone()),
                ("Slug", correspondent.slug.clone()),
                ("Documents", correspondent.document_count.to_string()),
            ]);
        }
        CorrespondentsCommand::Create { name } => {
            let correspondent = client
                .create_correspondent(&NewCorrespondent { name: name.clone() })
                .await?;
            if output.is_json() {
                return output.json(&correspondent);
            }
            output.success(&format!(
                "Created correspondent {}: {}",
                correspondent.id, correspondent.name
            ));
        }
        CorrespondentsCommand::Edit {
            correspondent,
            name,
        } => {
            let Some(name) = name.clone().filter(|name| !name.is_empty()) else {
                bail!("no changes specified");
            };
            let id = resolve_arg(client, ResourceKind::Correspondent, correspondent).await?;
            let updated = client
                .update_correspondent(id, &CorrespondentChangeset { name: Some(name) })
                .await?;
            if output.is_json() {
                return output.json(&updated);
            }
            output.success(&format!("Updated correspondent {id}"));
        }
        CorrespondentsCommand::Delete {
            correspondent,
            force,
        } => {
            let id = resolve_arg(client, ResourceKind::Correspondent, correspondent).await?;
            if !force && !output.confirm(&format!("Delete correspondent {id}?"))? {
                println!("Cancelled");
                return Ok(());
            }
            client.delete_correspondent(id).await?;
            output.success(&format!("Deleted correspondent {id}"));
        }
    }
    Ok(())
}
