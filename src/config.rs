//! Configuration and credentials for the monitored repository.

use crate::{
    constants::{
        CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_CONCURRENCY, DEFAULT_INTERVAL_SECS,
        DEFAULT_PER_PAGE, STATE_FILE_NAME, TOKEN_ENV,
    },
    history::MissingWatermark,
    store::write_atomic,
};
use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading, validating or persisting the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration found at {0}, run `commit-notify config` first")]
    Missing(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("could not determine the home directory")]
    NoHomeDir,
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// The identity of the monitored repository and the token used to access it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Credentials {
    /// The account owning the repository.
    pub username: String,
    /// The repository name.
    pub repository: String,
    /// A personal access token.
    pub access_token: String,
}

/// The persisted configuration record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub username: String,
    pub repository: String,
    /// May be left empty when `GITHUB_TOKEN` supplies the token.
    #[serde(default)]
    pub access_token: String,
    /// Seconds slept between two polling cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Commits fetched per branch and cycle.
    #[serde(default = "default_per_page")]
    pub per_page: u8,
    /// Maximum number of requests in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub missing_watermark: MissingWatermark,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_per_page() -> u8 {
    DEFAULT_PER_PAGE
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Config {
    /// Creates a configuration for the given credentials with default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            username: credentials.username,
            repository: credentials.repository,
            access_token: credentials.access_token,
            interval_secs: DEFAULT_INTERVAL_SECS,
            per_page: DEFAULT_PER_PAGE,
            concurrency: DEFAULT_CONCURRENCY,
            api_url: DEFAULT_API_URL.to_string(),
            missing_watermark: MissingWatermark::default(),
        }
    }

    /// Parses and validates a configuration from its TOML form.
    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration, applies the token override, then validates the result.
    pub fn parse_with_token(raw: &str, token: Option<String>) -> ConfigResult<Self> {
        let config = toml::from_str::<Self>(raw)?.with_token_override(token);
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration at `path`. The access token is replaced by the value of
    /// `GITHUB_TOKEN` when that variable is set.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::parse_with_token(&raw, std::env::var(TOKEN_ENV).ok())?;
        debug!(path = %path.display(), repository = %config.slug(), "loaded configuration");
        Ok(config)
    }

    /// Persists the configuration to `path`.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        let raw = toml::to_string_pretty(self)?;
        write_atomic(path, raw.as_bytes()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces the access token if `token` is a non-empty value.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.access_token = token.trim().to_string();
        }
        self
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("username", &self.username),
            ("repository", &self.repository),
            ("access-token", &self.access_token),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("`{}` must not be empty", field)));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "`{}` must not contain whitespace",
                    field
                )));
            }
        }
        if self.username.contains('/') || self.repository.contains('/') {
            return Err(ConfigError::Invalid(
                "`username` and `repository` must not contain `/`".to_string(),
            ));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "`interval-secs` must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.per_page) {
            return Err(ConfigError::Invalid(
                "`per-page` must be between 1 and 100".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "`concurrency` must be at least 1".to_string(),
            ));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "`api-url` must start with http:// or https://".to_string(),
            ));
        }
        Ok(())
    }

    /// The credentials used to access the repository.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            repository: self.repository.clone(),
            access_token: self.access_token.clone(),
        }
    }

    /// The polling interval.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// `owner/repository`, for display.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.username, self.repository)
    }

    /// Prompts the user for credentials. Settings other than the credentials are carried over
    /// from `existing`, if given.
    pub fn prompt(existing: Option<&Config>) -> ConfigResult<Self> {
        let username = inquire::Text::new("GitHub username:")
            .with_initial_value(existing.map_or("", |c| c.username.as_str()))
            .prompt()?;
        let repository = inquire::Text::new("Repository name:")
            .with_initial_value(existing.map_or("", |c| c.repository.as_str()))
            .prompt()?;
        let access_token = inquire::Password::new("GitHub access token:")
            .without_confirmation()
            .prompt()?;

        let credentials = Credentials {
            username: username.trim().to_string(),
            repository: repository.trim().to_string(),
            access_token: access_token.trim().to_string(),
        };
        let config = match existing {
            Some(existing) => Self {
                username: credentials.username,
                repository: credentials.repository,
                access_token: credentials.access_token,
                ..existing.clone()
            },
            None => Self::new(credentials),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Supplies the configuration, prompting for credentials when none are stored or `reconfigure`
/// is set. Newly entered credentials are persisted to `path`.
pub fn load_or_prompt(path: &Path, reconfigure: bool) -> ConfigResult<Config> {
    let existing = match Config::load(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Missing(_)) => None,
        Err(e) if reconfigure => {
            debug!(error = %e, "ignoring unreadable configuration");
            None
        }
        Err(e) => return Err(e),
    };

    match existing {
        Some(config) if !reconfigure => Ok(config),
        existing => {
            let config = Config::prompt(existing.as_ref())?;
            config.save(path)?;
            Ok(config)
        }
    }
}

/// The default location of the configuration file.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

/// The default location of the watermark file.
pub fn default_state_path() -> ConfigResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(STATE_FILE_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod test {
    use super::{Config, ConfigError, Credentials};
    use crate::history::MissingWatermark;

    fn credentials() -> Credentials {
        Credentials {
            username: "octocat".to_string(),
            repository: "hello-world".to_string(),
            access_token: "ghp_secret".to_string(),
        }
    }

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = Config::from_toml(
            r#"
            username = "octocat"
            repository = "hello-world"
            access-token = "ghp_secret"
            "#,
        )
        .unwrap();

        assert_eq!(config, Config::new(credentials()));
        assert_eq!(config.interval().as_secs(), 10);
        assert_eq!(config.slug(), "octocat/hello-world");
    }

    #[test]
    fn parses_full_config() {
        let config = Config::from_toml(
            r#"
            username = "octocat"
            repository = "hello-world"
            access-token = "ghp_secret"
            interval-secs = 60
            per-page = 100
            concurrency = 1
            api-url = "https://github.example.com/api/v3"
            missing-watermark = "report-none"
            "#,
        )
        .unwrap();

        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.missing_watermark, MissingWatermark::ReportNone);
    }

    #[test]
    fn rejects_invalid_values() {
        let invalid = [
            Config {
                username: String::new(),
                ..Config::new(credentials())
            },
            Config {
                repository: "octocat/hello-world".to_string(),
                ..Config::new(credentials())
            },
            Config {
                access_token: "ghp secret".to_string(),
                ..Config::new(credentials())
            },
            Config {
                interval_secs: 0,
                ..Config::new(credentials())
            },
            Config {
                per_page: 101,
                ..Config::new(credentials())
            },
            Config {
                concurrency: 0,
                ..Config::new(credentials())
            },
            Config {
                api_url: "api.github.com".to_string(),
                ..Config::new(credentials())
            },
        ];

        for config in invalid {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn rejects_unknown_missing_watermark_policy() {
        let result = Config::from_toml(
            r#"
            username = "octocat"
            repository = "hello-world"
            access-token = "ghp_secret"
            missing-watermark = "guess"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn token_override() {
        let config = Config::new(credentials());
        assert_eq!(
            config
                .clone()
                .with_token_override(Some(" ghp_env ".to_string()))
                .access_token,
            "ghp_env"
        );
        assert_eq!(
            config
                .clone()
                .with_token_override(Some(String::new()))
                .access_token,
            "ghp_secret"
        );
        assert_eq!(config.with_token_override(None).access_token, "ghp_secret");
    }

    #[test]
    fn token_may_come_only_from_environment() {
        let raw = r#"
            username = "octocat"
            repository = "hello-world"
            access-token = ""
        "#;

        let config = Config::parse_with_token(raw, Some("ghp_env".to_string())).unwrap();
        assert_eq!(config.access_token, "ghp_env");

        let config = Config::parse_with_token(
            "username = \"octocat\"\nrepository = \"hello-world\"",
            Some("ghp_env".to_string()),
        )
        .unwrap();
        assert_eq!(config.access_token, "ghp_env");

        assert!(matches!(
            Config::parse_with_token(raw, None),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            interval_secs: 30,
            ..Config::new(credentials())
        };
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("access-token = \"ghp_secret\""));
        assert_eq!(Config::from_toml(&raw).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::Missing(p)) if p == path));
    }
}
