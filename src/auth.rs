//! Credential resolution for remote fetch/push.
//!
//! Turns the `auth*` keys of the provider configuration into an
//! [`AuthStrategy`] and builds the `git2` remote callbacks that present those
//! credentials to the transport.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, RemoteCallbacks};

use crate::error::{ProviderError, Result};

/// Default SSH user when neither the config nor the remote URL names one.
pub const DEFAULT_SSH_USER: &str = "git";

/// Where an SSH private key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SshKey {
    /// Key file on disk
    Path(PathBuf),
    /// Key material given directly in the configuration
    Inline(String),
}

impl SshKey {
    fn from_value(value: &str) -> Self {
        if value.contains("-----BEGIN") {
            SshKey::Inline(value.to_string())
        } else {
            SshKey::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Debug for SshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SshKey::Path(path) => f.debug_tuple("Path").field(path).finish(),
            SshKey::Inline(_) => f.write_str("Inline(<redacted>)"),
        }
    }
}

/// Authentication attached to network operations.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthStrategy {
    /// No credentials; only works for local or anonymous remotes
    #[default]
    None,
    /// Username plus password or token over HTTP(S)
    Basic { username: String, password: String },
    /// SSH private key with optional passphrase
    Ssh {
        user: String,
        key: SshKey,
        passphrase: Option<String>,
    },
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStrategy::None => f.write_str("None"),
            AuthStrategy::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            AuthStrategy::Ssh {
                user,
                key,
                passphrase,
            } => f
                .debug_struct("Ssh")
                .field("user", user)
                .field("key", key)
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

fn required<'a>(config: &'a HashMap<String, String>, key: &str, mode: &str) -> Result<&'a str> {
    match config.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ProviderError::config(format!(
            "'{}' is required when auth={}",
            key, mode
        ))),
    }
}

fn optional<'a>(config: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

impl AuthStrategy {
    /// Resolves the strategy selected by the `auth` key.
    ///
    /// # Arguments
    /// * `config` - Flat provider configuration
    ///
    /// # Returns
    /// * `Ok(AuthStrategy)` - The strategy with only its own fields populated
    /// * `Err(ProviderError::Configuration)` - Unknown mode or missing fields
    pub fn from_config(config: &HashMap<String, String>) -> Result<Self> {
        let mode = config
            .get("auth")
            .map(|m| m.trim().to_lowercase())
            .unwrap_or_default();

        match mode.as_str() {
            "" | "none" => Ok(AuthStrategy::None),
            "basic" => Ok(AuthStrategy::Basic {
                username: required(config, "auth_username", "basic")?.to_string(),
                // Passwords may legitimately carry surrounding spaces
                password: match config.get("auth_password") {
                    Some(p) if !p.is_empty() => p.clone(),
                    _ => {
                        return Err(ProviderError::config(
                            "'auth_password' is required when auth=basic",
                        ))
                    }
                },
            }),
            "ssh" => Ok(AuthStrategy::Ssh {
                user: optional(config, "auth_ssh_user")
                    .unwrap_or(DEFAULT_SSH_USER)
                    .to_string(),
                key: SshKey::from_value(required(config, "auth_ssh_key", "ssh")?),
                passphrase: optional(config, "auth_ssh_passphrase").map(str::to_string),
            }),
            other => Err(ProviderError::config(format!(
                "unknown auth mode '{}' (expected none, basic or ssh)",
                other
            ))),
        }
    }

    /// Short mode name, for logs and display
    pub fn mode(&self) -> &'static str {
        match self {
            AuthStrategy::None => "none",
            AuthStrategy::Basic { .. } => "basic",
            AuthStrategy::Ssh { .. } => "ssh",
        }
    }

    /// Produces a credential for one request from the transport.
    fn credential(
        &self,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        match self {
            AuthStrategy::None => {
                if allowed.contains(CredentialType::DEFAULT) {
                    Cred::default()
                } else {
                    Err(git2::Error::from_str(
                        "remote requires credentials but auth is 'none'",
                    ))
                }
            }
            AuthStrategy::Basic { username, password } => {
                if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                    Cred::userpass_plaintext(username, password)
                } else {
                    Err(git2::Error::from_str(
                        "remote does not accept username/password credentials",
                    ))
                }
            }
            AuthStrategy::Ssh {
                user,
                key,
                passphrase,
            } => {
                let user = username_from_url.unwrap_or(user);
                if allowed.contains(CredentialType::USERNAME) {
                    return Cred::username(user);
                }
                if !allowed.contains(CredentialType::SSH_KEY) {
                    return Err(git2::Error::from_str(
                        "remote does not accept SSH key credentials",
                    ));
                }
                match key {
                    SshKey::Path(path) => {
                        Cred::ssh_key(user, None, Path::new(path), passphrase.as_deref())
                    }
                    SshKey::Inline(pem) => {
                        Cred::ssh_key_from_memory(user, None, pem, passphrase.as_deref())
                    }
                }
            }
        }
    }

    /// Answers one credential request, recording a rejection in `rejected`.
    fn respond(
        &self,
        guard: &mut CredentialGuard,
        rejected: &Cell<bool>,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        guard
            .check(allowed)
            .and_then(|()| self.credential(username_from_url, allowed))
            .map_err(|e| {
                rejected.set(true);
                e
            })
    }

    /// Builds remote callbacks that answer credential requests.
    ///
    /// A refused request sets `rejected`, so callers can report an
    /// authentication failure instead of a generic transport error.
    pub fn remote_callbacks<'a>(&'a self, rejected: &'a Cell<bool>) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();
        let mut guard = CredentialGuard::default();

        callbacks.credentials(move |_url, username_from_url, allowed| {
            self.respond(&mut guard, rejected, username_from_url, allowed)
        });

        callbacks
    }
}

/// Stops libgit2 from asking for the same credential forever.
///
/// libgit2 asks again whenever the remote rejects what it was given. A
/// second request in a row for the same kind of credential means the first
/// answer was refused.
#[derive(Debug, Default)]
pub struct CredentialGuard {
    last_allowed: Option<CredentialType>,
}

impl CredentialGuard {
    pub fn check(&mut self, allowed: CredentialType) -> std::result::Result<(), git2::Error> {
        // A username-only round precedes the key round for SSH
        if self.last_allowed == Some(allowed) {
            return Err(git2::Error::from_str("credentials rejected by remote"));
        }
        self.last_allowed = Some(allowed);
        Ok(())
    }
}
