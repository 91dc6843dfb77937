use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::ApiClient;
use crate::models::ResourceKind;

use super::output::{yes_no, Output};
use super::resolve_arg;

#[derive(Debug, Args)]
pub struct ViewsArgs {
    #[command(subcommand)]
    pub command: ViewsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ViewsCommand {
    /// List all saved views
    List,
    /// Show saved view details
    Get {
        /// Saved view ID or name
        view: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct SavedViewRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DASHBOARD")]
    dashboard: &'static str,
    #[tabled(rename = "SIDEBAR")]
    sidebar: &'static str,
}

pub async fn execute(args: &ViewsArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        ViewsCommand::List => {
            let views = client.list_saved_views().await?;
            if output.is_json() {
                return output.json(&views);
            }
            let rows: Vec<_> = views
                .iter()
                .map(|view| SavedViewRow {
                    id: view.id,
                    name: view.name.clone(),
                    dashboard: yes_no(view.show_on_dashboard),
                    sidebar: yes_no(view.show_in_sidebar),
                })
                .collect();
            output.table(&rows, "No saved views found");
        }
        ViewsCommand::Get { view } => {
            let id = resolve_arg(client, ResourceKind::SavedView, view).await?;
            let view = client.get_saved_view(id).await?;
            if output.is_json() {
                return output.json(&view);
            }
            output.fields(&[
                ("ID", view.id.to_string()),
                ("Name", view.name.clone()),
                ("Dashboard", yes_no(view.show_on_dashboard).to_string()),
                ("Sidebar", yes_no(view.show_in_sidebar).to_string()),
                (
                    "Sort",
                    format!(
                        "{} (reverse: {})",
                        view.sort_field.as_deref().unwrap_or("-"),
                        yes_no(view.sort_reverse)
                    ),
                ),
                ("Filter rules", view.filter_rules.len().to_string()),
            ]);
        }
    }
    Ok(())
}
