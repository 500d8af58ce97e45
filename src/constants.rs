//! Constants for the `commit-notify` application.

use nu_ansi_term::Color;
use std::time::Duration;

/// Name of the configuration file, relative to the home directory.
pub(crate) const CONFIG_FILE_NAME: &str = ".commit-notify.toml";

/// Name of the watermark file, relative to the home directory.
pub(crate) const STATE_FILE_NAME: &str = ".commit-notify.state";

pub(crate) const DEFAULT_API_URL: &str = "https://api.github.com";
pub(crate) const DEFAULT_INTERVAL_SECS: u64 = 10;
pub(crate) const DEFAULT_PER_PAGE: u8 = 30;
pub(crate) const DEFAULT_CONCURRENCY: usize = 4;

/// Environment variable overriding the configured access token.
pub(crate) const TOKEN_ENV: &str = "GITHUB_TOKEN";

pub(crate) const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const APP_NAME: &str = "CommitNotify";
pub(crate) const NOTIFICATION_TITLE: &str = "New Commit Alert";

pub(crate) const RULE_WIDTH: usize = 50;
pub(crate) const RULE_COLOR: Color = Color::Cyan;
pub(crate) const BRANCH_COLOR: Color = Color::Purple;
pub(crate) const COMMITTER_COLOR: Color = Color::Blue;
pub(crate) const MESSAGE_COLOR: Color = Color::Yellow;
pub(crate) const ADDED_COLOR: Color = Color::Green;
pub(crate) const MODIFIED_COLOR: Color = Color::Blue;
pub(crate) const REMOVED_COLOR: Color = Color::Red;
