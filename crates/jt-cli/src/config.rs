//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use jt_core::Rules;
use jt_jira::Credentials;

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Jira site, e.g. `https://example.atlassian.net`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_url: Option<String>,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Issue, ignore and round rules handed to the parser.
    #[serde(flatten)]
    pub rules: Rules,
}

/// Jira credentials. Either `access_token`, or `user` plus `api_token`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jira_url", &self.jira_url)
            .field("auth", &self.auth)
            .field("rules", &self.rules)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AuthConfig")
            .field("user", &self.user)
            .field("api_token", &redact(&self.api_token))
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}

impl AuthConfig {
    /// Picks the configured credentials, preferring an access token.
    pub fn credentials(&self) -> Result<Credentials> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        if let Some(token) = non_empty(&self.access_token) {
            return Ok(Credentials::Bearer { token });
        }
        match (non_empty(&self.user), non_empty(&self.api_token)) {
            (Some(user), Some(api_token)) => Ok(Credentials::Basic { user, api_token }),
            _ => bail!(
                "missing Jira credentials (set auth.user and auth.api_token, or auth.access_token)"
            ),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (JT_*, nested keys with __)
        figment = figment.merge(Env::prefixed("JT_").split("__"));

        figment.extract()
    }

    /// Returns the Jira base URL, or an error if none is configured.
    pub fn jira_url(&self) -> Result<&str> {
        match self.jira_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!("missing Jira URL (set jira_url in config.toml or JT_JIRA_URL)"),
        }
    }
}

/// Returns the platform-specific config directory for jt.
///
/// On Linux: `~/.config/jt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("jt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn test_dirs_config_path_ends_with_jt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "jt");
    }

    #[test]
    fn test_load_rules_from_file() {
        let (_temp, path) = write_config(
            r#"
jira_url = "https://example.atlassian.net"
ignore = ["^lunch$"]
round = ["^INTERNAL-"]

[auth]
user = "me@example.com"
api_token = "secret"

[[issues]]
id = "FOO-12"
patterns = ["^foo sync$"]
default_comment = "weekly sync"

[[issues]]
id = "INTERNAL-1"
regexes = ["^admin$", "^email$"]
"#,
        );

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.jira_url().unwrap(), "https://example.atlassian.net");
        let ids: Vec<_> = config.rules.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["FOO-12", "INTERNAL-1"]);
        assert_eq!(config.rules.issues[1].patterns.len(), 2);
        assert_eq!(
            config.rules.issues[0].default_comment.as_deref(),
            Some("weekly sync")
        );
        assert!(config.rules.is_ignored("lunch"));
        assert_eq!(config.rules.round[0].as_str(), "^INTERNAL-");
        assert!(matches!(
            config.auth.credentials().unwrap(),
            Credentials::Basic { ref user, .. } if user == "me@example.com"
        ));
    }

    #[test]
    fn test_invalid_pattern_fails_to_load() {
        let (_temp, path) = write_config("ignore = [\"(unclosed\"]\n");
        assert!(Config::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_access_token_preferred() {
        let auth = AuthConfig {
            user: Some("me".to_string()),
            api_token: Some("basic".to_string()),
            access_token: Some("bearer".to_string()),
        };
        assert!(matches!(
            auth.credentials().unwrap(),
            Credentials::Bearer { ref token } if token == "bearer"
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let auth = AuthConfig {
            user: Some("me".to_string()),
            api_token: Some("  ".to_string()),
            access_token: None,
        };
        assert!(auth.credentials().is_err());
    }

    #[test]
    fn test_missing_jira_url() {
        let config = Config::default();
        assert!(config.jira_url().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            auth: AuthConfig {
                user: Some("me".to_string()),
                api_token: Some("hunter2".to_string()),
                access_token: None,
            },
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
