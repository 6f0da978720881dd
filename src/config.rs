use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::AuthStrategy;
use crate::domain::TagPattern;
use crate::error::{ProviderError, Result};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "provider-git.toml";

const KNOWN_KEYS: &[&str] = &[
    "git_path",
    "default_branch",
    "tagger_name",
    "tagger_email",
    "remote_name",
    "tag_prefix",
    "push_branch",
    "auth",
    "auth_username",
    "auth_password",
    "auth_ssh_key",
    "auth_ssh_passphrase",
    "auth_ssh_user",
];

/// Identity written into annotated release tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tagger {
    pub name: String,
    pub email: String,
}

impl Tagger {
    /// Both name and email are required before a tag can be written
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }
}

/// Resolved provider configuration.
///
/// Built from the flat string map handed over by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub git_path: PathBuf,

    /// Explicit default branch; `None` means "whatever HEAD points at"
    pub default_branch: Option<String>,

    pub tagger: Tagger,

    pub auth: AuthStrategy,

    pub remote_name: String,

    pub tag_pattern: TagPattern,

    /// Push the default branch together with a new release tag
    pub push_branch: bool,
}

fn value<'a>(config: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_bool(config: &HashMap<String, String>, key: &str) -> Result<bool> {
    match value(config, key).map(|v| v.to_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ProviderError::config(format!(
                "'{}' must be a boolean, got '{}'",
                key, other
            ))),
        },
    }
}

impl ProviderConfig {
    /// Parse the host configuration map.
    ///
    /// `git_path` is checked first: without it there is no repository to
    /// operate on, whatever else the map contains.
    pub fn from_map(config: &HashMap<String, String>) -> Result<Self> {
        let git_path = value(config, "git_path").ok_or(ProviderError::RepositoryNotFound)?;

        for key in config.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::debug!("ignoring unknown configuration key '{}'", key);
            }
        }

        Ok(ProviderConfig {
            git_path: PathBuf::from(git_path),
            default_branch: value(config, "default_branch").map(str::to_string),
            tagger: Tagger {
                name: value(config, "tagger_name").unwrap_or_default().to_string(),
                email: value(config, "tagger_email").unwrap_or_default().to_string(),
            },
            auth: AuthStrategy::from_config(config)?,
            remote_name: value(config, "remote_name")
                .unwrap_or("origin")
                .to_string(),
            // An explicitly empty prefix is allowed, so no trimming here
            tag_pattern: TagPattern::new(
                config
                    .get("tag_prefix")
                    .map(String::as_str)
                    .unwrap_or("v"),
            ),
            push_branch: parse_bool(config, "push_branch")?,
        })
    }
}

fn toml_to_string(key: &str, value: toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        other => Err(ProviderError::config(format!(
            "'{}' must be a plain value, got {}",
            key,
            other.type_str()
        ))),
    }
}

/// Parses a flat TOML document into the provider's configuration map.
pub fn parse_config(content: &str) -> Result<HashMap<String, String>> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| ProviderError::config(format!("invalid configuration file: {}", e)))?;

    table
        .into_iter()
        .map(|(key, value)| {
            let value = toml_to_string(&key, value)?;
            Ok((key, value))
        })
        .collect()
}

/// Loads the configuration map from file or returns an empty map.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `provider-git.toml` in current directory
/// 3. `provider-git.toml` in user config directory
/// 4. Empty map if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(HashMap)` - Loaded or empty configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<HashMap<String, String>> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if local.exists() {
        local
    } else if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        path
    } else {
        return Ok(HashMap::new());
    };

    log::debug!("loading configuration from {}", path.display());
    let content = fs::read_to_string(&path)?;
    parse_config(&content)
}
