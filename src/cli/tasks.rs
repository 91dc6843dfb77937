use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::ApiClient;

use super::output::Output;

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    /// Show the status of an ingestion task
    Status {
        /// Task ID printed by `documents upload`
        task_id: String,
    },
}

pub async fn execute(args: &TasksArgs, client: &ApiClient, output: &Output) -> Result<()> {
    match &args.command {
        TasksCommand::Status { task_id } => {
            let task = client.get_task(task_id).await?;
            if output.is_json() {
                return output.json(&task);
            }

            let mut fields = vec![
                ("Task ID", task.task_id.clone()),
                ("Status", task.status.to_string()),
                ("Type", task.task_type.clone().unwrap_or_default()),
                ("File", task.task_file_name.clone().unwrap_or_default()),
                ("Created", task.date_created.clone().unwrap_or_default()),
            ];
            if let Some(done) = &task.date_done {
                fields.push(("Completed", done.clone()));
            }
            if let Some(result) = task.result.as_deref().filter(|result| !result.is_empty()) {
                fields.push(("Result", result.to_string()));
            }
            if let Some(document) = task.document_id() {
                fields.push(("Document", document.to_string()));
            }
            output.fields(&fields);
        }
    }
    Ok(())
}
