use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::policy::message::{StaleTemplate, TemplateError};

pub const DEFAULT_CONFIG_FILE: &str = "concierge.toml";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BOT_LOGIN: &str = "cesium-concierge";
const DEFAULT_BASE_BRANCH: &str = "master";
const DEFAULT_MAX_DAYS_SINCE_UPDATE: f64 = 30.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Repository {0} is not configured")]
    UnknownRepository(String),

    #[error("Repository {repository} has no stale_pull_request_template")]
    MissingTemplate { repository: String },

    #[error("Repository {repository}: max_days_since_update must be a positive number, got {value}")]
    InvalidThreshold { repository: String, value: f64 },

    #[error("Repository {repository}: {source}")]
    Template {
        repository: String,
        #[source]
        source: TemplateError,
    },

    #[error("Repository {repository}: token is not a valid header value")]
    InvalidHeader { repository: String },
}

/// Top-level configuration loaded from concierge.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    /// Per-repository policy settings keyed by `owner/name`
    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// API root, overridable for GitHub Enterprise
    pub api_url: Option<String>,
    /// Login the bot posts as; stop commands must mention it
    pub bot_login: Option<String>,
}

/// Raw `[repositories."owner/name"]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryConfig {
    pub max_days_since_update: Option<f64>,
    /// MiniJinja source; `{{ maxDaysSinceUpdate }}` is available
    pub stale_pull_request_template: Option<String>,
    #[serde(default)]
    pub third_party_folders: Vec<String>,
    #[serde(default)]
    pub check_changes_md: bool,
    pub base_branch: Option<String>,
    /// Overrides the global token for this repository
    pub token: Option<String>,
}

/// Validated settings for one repository, fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct RepositorySettings {
    pub headers: HeaderMap,
    pub max_days_since_update: f64,
    pub stale_template: Option<StaleTemplate>,
    pub third_party_folders: Vec<String>,
    pub check_changes_md: bool,
    pub base_branch: String,
}

impl RepositorySettings {
    /// The stale template, required once the stale job reaches this repository.
    pub fn stale_template(&self, repository: &str) -> Result<&StaleTemplate, ConfigError> {
        self.stale_template
            .as_ref()
            .ok_or_else(|| ConfigError::MissingTemplate {
                repository: repository.to_string(),
            })
    }
}

impl Config {
    /// Load configuration from `path`, or from concierge.toml in the current
    /// directory. Returns default config if the default file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from(default)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        self.github
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    pub fn bot_login(&self) -> &str {
        self.github.bot_login.as_deref().unwrap_or(DEFAULT_BOT_LOGIN)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    /// Validate every configured repository.
    pub fn repository_settings(&self) -> Result<BTreeMap<String, RepositorySettings>, ConfigError> {
        self.repositories
            .iter()
            .map(|(name, raw)| Ok((name.clone(), self.build_settings(name, raw)?)))
            .collect()
    }

    pub fn settings_for(&self, repository: &str) -> Result<RepositorySettings, ConfigError> {
        let raw = self
            .repositories
            .get(repository)
            .ok_or_else(|| ConfigError::UnknownRepository(repository.to_string()))?;
        self.build_settings(repository, raw)
    }

    fn build_settings(&self, name: &str, raw: &RepositoryConfig) -> Result<RepositorySettings, ConfigError> {
        let max_days_since_update = raw
            .max_days_since_update
            .unwrap_or(DEFAULT_MAX_DAYS_SINCE_UPDATE);
        if !(max_days_since_update.is_finite() && max_days_since_update > 0.0) {
            return Err(ConfigError::InvalidThreshold {
                repository: name.to_string(),
                value: max_days_since_update,
            });
        }

        let stale_template = raw
            .stale_pull_request_template
            .as_deref()
            .map(StaleTemplate::from_source)
            .transpose()
            .map_err(|source| ConfigError::Template {
                repository: name.to_string(),
                source,
            })?;

        let token = raw.token.clone().or_else(|| self.github_token());

        Ok(RepositorySettings {
            headers: auth_headers(name, token.as_deref())?,
            max_days_since_update,
            stale_template,
            third_party_folders: raw.third_party_folders.clone(),
            check_changes_md: raw.check_changes_md,
            base_branch: raw
                .base_branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string()),
        })
    }
}

fn auth_headers(repository: &str, token: Option<&str>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
            ConfigError::InvalidHeader {
                repository: repository.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
