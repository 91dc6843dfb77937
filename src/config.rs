use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const URL_ENV: &str = "PAPERLESS_URL";
pub const TOKEN_ENV: &str = "PAPERLESS_TOKEN";

/// Settings persisted by `paperless config`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
}

impl ConfigFile {
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".config").join("paperless-cli").join("config.yaml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// A missing file is an empty config, not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            restrict_permissions(dir, 0o700)?;
        }
        let raw = serde_yaml::to_string(self).context("failed to serialize config")?;
        fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))?;
        restrict_permissions(path, 0o600)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Connection settings for one command run.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    pub token: String,
}

impl AppConfig {
    /// Resolves the server URL (`--url` flag, then `PAPERLESS_URL`, then the
    /// config file) and the token (`PAPERLESS_TOKEN`, then the config file).
    pub fn load(url_override: Option<&str>) -> Result<Self> {
        let file = ConfigFile::load()?;
        Self::from_sources(
            url_override,
            env::var(URL_ENV).ok().as_deref(),
            env::var(TOKEN_ENV).ok().as_deref(),
            &file,
        )
    }

    pub fn from_sources(
        url_override: Option<&str>,
        env_url: Option<&str>,
        env_token: Option<&str>,
        file: &ConfigFile,
    ) -> Result<Self> {
        let base_url = first_non_empty(&[url_override, env_url, Some(file.url.as_str())])
            .ok_or_else(|| {
                anyhow!(
                    "no server URL configured. Set {URL_ENV} or run 'paperless config set-url <url>'"
                )
            })?;
        let token = first_non_empty(&[env_token, Some(file.token.as_str())]).ok_or_else(|| {
            anyhow!(
                "no API token configured. Set {TOKEN_ENV} or run 'paperless config set-token <token>'"
            )
        })?;

        Ok(Self { base_url, token })
    }

    pub fn redacted_token(&self) -> String {
        mask_token(&self.token)
    }
}

fn first_non_empty(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Shows at most the first and last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        1..=8 => "****".to_string(),
        len => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[len - 4..].iter().collect();
            format!("{head}...{tail}")
        }
    }
}
