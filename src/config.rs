//! Run configuration built once from the environment.
//!
//! Components never read environment variables themselves; they receive a
//! [`Config`] constructed at startup.

use std::env;

use crate::error::ConfigError;

/// Values the run needs from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Committer display name, applied when initializing a repository.
    pub git_user_name: String,
    /// Committer contact address, applied when initializing a repository.
    pub git_user_email: String,
    /// Whether the semantic-version bump workflow is enabled.
    pub versioning_enabled: bool,
}

impl Config {
    /// Build a [`Config`] from `API_KEY`, `GIT_USER_NAME`, `GIT_USER_EMAIL`,
    /// and `ENABLE_VERSIONING`.
    ///
    /// Values are trimmed; the API key additionally sheds stray `=`
    /// characters that copy-paste from shell exports tends to leave behind.
    /// All three credential/identity variables must be non-empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = clean_api_key(&var_or_empty("API_KEY"));
        let git_user_name = var_or_empty("GIT_USER_NAME");
        let git_user_email = var_or_empty("GIT_USER_EMAIL");

        let mut missing = Vec::new();
        if api_key.is_empty() {
            missing.push("API_KEY".to_string());
        }
        if git_user_name.is_empty() {
            missing.push("GIT_USER_NAME".to_string());
        }
        if git_user_email.is_empty() {
            missing.push("GIT_USER_EMAIL".to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let versioning_enabled = env::var("ENABLE_VERSIONING")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Config {
            api_key,
            git_user_name,
            git_user_email,
            versioning_enabled,
        })
    }
}

fn var_or_empty(name: &str) -> String {
    env::var(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Strip whitespace and leading/trailing `=` from a pasted API key.
fn clean_api_key(raw: &str) -> String {
    raw.trim().trim_matches('=').trim().to_string()
}
