//! Command definitions and dispatch for the `paperless` binary.

pub mod config;
pub mod correspondents;
pub mod document_types;
pub mod documents;
pub mod output;
pub mod search;
pub mod stats;
pub mod storage_paths;
pub mod tags;
pub mod tasks;
pub mod views;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::models::ResourceKind;
use crate::resolve::resolve;
use output::Output;

/// Command-line client for Paperless-ngx document management.
///
/// Set PAPERLESS_URL and PAPERLESS_TOKEN, or save them with
/// `paperless config set-url` and `paperless config set-token`.
#[derive(Debug, Parser)]
#[command(name = "paperless", version, about, long_about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Server URL (overrides environment and config file)
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List, search, upload, download and edit documents
    #[command(visible_aliases = ["docs", "doc"])]
    Documents(documents::DocumentsArgs),
    /// Manage tags
    Tags(tags::TagsArgs),
    /// Manage correspondents
    Correspondents(correspondents::CorrespondentsArgs),
    /// Manage document types
    Types(document_types::TypesArgs),
    /// Manage storage paths
    #[command(visible_aliases = ["paths", "storage-paths"])]
    Storage(storage_paths::StorageArgs),
    /// Show saved views
    #[command(visible_alias = "saved-views")]
    Views(views::ViewsArgs),
    /// Inspect ingestion tasks
    Tasks(tasks::TasksArgs),
    /// Search across documents, tags, correspondents and more
    Search(search::SearchArgs),
    /// Show server statistics
    Stats,
    /// Manage CLI configuration
    Config(config::ConfigArgs),
}

impl Cli {
    pub fn output(&self) -> Output {
        Output::new(self.global.json, self.global.quiet)
    }

    pub async fn execute(&self) -> Result<()> {
        let output = self.output();
        match &self.command {
            Commands::Documents(args) => documents::execute(args, &self.client()?, &output).await,
            Commands::Tags(args) => tags::execute(args, &self.client()?, &output).await,
            Commands::Correspondents(args) => {
                correspondents::execute(args, &self.client()?, &output).await
            }
            Commands::Types(args) => document_types::execute(args, &self.client()?, &output).await,
            Commands::Storage(args) => storage_paths::execute(args, &self.client()?, &output).await,
            Commands::Views(args) => views::execute(args, &self.client()?, &output).await,
            Commands::Tasks(args) => tasks::execute(args, &self.client()?, &output).await,
            Commands::Search(args) => search::execute(args, &self.client()?, &output).await,
            Commands::Stats => stats::execute(&self.client()?, &output).await,
            Commands::Config(args) => config::execute(args, self.global.url.as_deref(), &output),
        }
    }

    fn client(&self) -> Result<ApiClient> {
        let config = AppConfig::load(self.global.url.as_deref())?;
        tracing::debug!(url = %config.base_url, token = %config.redacted_token(), "using server");
        Ok(ApiClient::new(&config.base_url, &config.token)?)
    }
}

/// Resolves a name-or-id argument for `kind`.
pub(crate) async fn resolve_arg(client: &ApiClient, kind: ResourceKind, token: &str) -> Result<i64> {
    Ok(resolve(client, kind, token).await?)
}

/// Like [`resolve_arg`], but `-` and `none` mean "clear the reference".
pub(crate) async fn resolve_clearable(
    client: &ApiClient,
    kind: ResourceKind,
    token: Option<&str>,
) -> Result<Option<Option<i64>>> {
    match token.map(str::trim) {
        None => Ok(None),
        Some("-") | Some("none") => Ok(Some(None)),
        Some(token) => Ok(Some(Some(resolve_arg(client, kind, token).await?))),
    }
}
