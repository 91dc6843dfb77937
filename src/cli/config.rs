use std::env;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;
use tracing::info;

use crate::config::{mask_token, ConfigFile, TOKEN_ENV, URL_ENV};

use super::output::Output;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Save the default server URL
    SetUrl { url: String },
    /// Save the API token
    SetToken { token: String },
    /// Show the saved configuration
    Show,
}

pub fn execute(args: &ConfigArgs, url_flag: Option<&str>, output: &Output) -> Result<()> {
    match &args.command {
        ConfigCommand::SetUrl { url } => {
            let mut file = ConfigFile::load().context("failed to load config")?;
            file.url = url.trim().to_string();
            let path = file.save().context("failed to save URL")?;
            info!(path = %path.display(), "server URL saved");
            output.success(&format!("URL set to: {}", file.url));
        }
        ConfigCommand::SetToken { token } => {
            let mut file = ConfigFile::load().context("failed to load config")?;
            file.token = token.trim().to_string();
            let path = file.save().context("failed to save token")?;
            info!(path = %path.display(), "API token saved");
            output.success("Token saved");
        }
        ConfigCommand::Show => {
            let file = ConfigFile::load().context("failed to load config")?;
            if output.is_json() {
                return output.json(&json!({
                    "url": file.url,
                    "token": mask_token(&file.token),
                }));
            }

            output.fields(&[("URL", file.url.clone()), ("Token", mask_token(&file.token))]);

            let env_url = env::var(URL_ENV).ok().filter(|url| !url.is_empty());
            if let Some(url) = url_flag.filter(|url| !url.is_empty()) {
                println!("\n(URL overridden by --url: {url})");
            } else if let Some(url) = env_url.filter(|url| *url != file.url) {
                println!("\n(URL overridden by {URL_ENV}: {url})");
            }
            if env::var(TOKEN_ENV)
                .ok()
                .is_some_and(|token| !token.is_empty() && token != file.token)
            {
                println!("(Token overridden by {TOKEN_ENV})");
            }
        }
    }
    Ok(())
}
