use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::tags::{NewTag, TagChangeset};
use crate::api::ApiClient;
use crate::models::{ResourceKind, Tag};

use super::output::{yes_no, Output};
use super::resolve_arg;

#[derive(Debug, Args)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// List all tags
    List,
    /// Show tag details
    Get {
        /// Tag ID or name
        tag: String,
    },
    /// Create a tag
    Create {
        name: String,
        /// Tag color (hex, e.g. #ff0000)
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a tag
    Edit {
        tag: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New color (hex)
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a tag
    Delete {
        tag: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TagRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "COLOR")]
    color: String,
    #[tabled(rename = "DOCUMENTS")]
    documents: i64,
}

impl From<&Tag> for TagRow {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            color: tag.color.clone(),
            documents: tag.document_count,
        }
    }
}

pub async fn execute(args: &TagsArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        TagsCommand::List => {
            let tags = client.list_tags().await?;
            if output.is_json() {
                return output.json(&tags);
            }
            let rows: Vec<TagRow> = tags.iter().map(TagRow::from).collect();
            output.table(&rows, "No tags found");
        }
        TagsCommand::Get { tag } => {
            let id = resolve_arg(client, ResourceKind::Tag, tag).await?;
            let tag = client.get_tag(id).await?;
            if output.is_json() {
                return output.json(&tag);
            }
            output.fields(&[
                ("ID", tag.id.to_string()),
                ("Name", tag.name.clone()),
                ("Slug", tag.slug.clone()),
                ("Color", tag.color.clone()),
                ("Documents", tag.document_count.to_string()),
                ("Inbox", yes_no(tag.is_inbox_tag).to_string()),
            ]);
        }
        TagsCommand::Create { name, color } => {
            let tag = client
                .create_tag(&NewTag {
                    name: name.clone(),
                    color: color.clone().filter(|color| !color.is_empty()),
                })
                .await?;
            if output.is_json() {
                return output.json(&tag);
            }
            output.success(&format!("Created tag {}: {}", tag.id, tag.name));
        }
        TagsCommand::Edit { tag, name, color } => {
            let changes = TagChangeset {
                name: name.clone().filter(|name| !name.is_empty()),
                color: color.clone().filter(|color| !color.is_empty()),
            };
            if changes.is_empty() {
                bail!("no changes specified");
            }
            let id = resolve_arg(client, ResourceKind::Tag, tag).await?;
            let tag = client.update_tag(id, &changes).await?;
            if output.is_json() {
                return output.json(&tag);
            }
            output.success(&format!("Updated tag {id}"));
        }
        TagsCommand::Delete { tag, force } => {
            let id = resolve_arg(client, ResourceKind::Tag, tag).await?;
            if !force && !output.confirm(&format!("Delete tag {id}?"))? {
                println!("Cancelled");
                return Ok(());
            }
            client.delete_tag(id).await?;
            output.success(&format!("Deleted tag {id}"));
        }
    }
    Ok(())
}
