//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub notices: NoticeConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub reply_rendering: Option<ReplyRendering>,
}

/// User-facing text for failed turns.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NoticeConfig {
    pub failure: Option<String>,
    pub timeout: Option<String>,
    pub cancelled: Option<String>,
}

/// How model replies are interpreted when drawn.
///
/// Replies come from a separate trust domain. `TrustedRichText` treats them
/// as markdown with inline HTML; `PlainText` shows them literally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReplyRendering {
    #[default]
    PlainText,
    TrustedRichText,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const DEFAULT_FAILURE_NOTICE: &str =
    "Could not reach the server. Check that the API is running.";
const DEFAULT_TIMEOUT_NOTICE: &str =
    "The server took too long to answer. Please try again.";
const DEFAULT_CANCELLED_NOTICE: &str = "Request cancelled.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Fixed strings appended as error messages. The cause is never shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notices {
    pub failure: String,
    pub timeout: String,
    pub cancelled: String,
}

impl Default for Notices {
    fn default() -> Self {
        Self {
            failure: DEFAULT_FAILURE_NOTICE.to_string(),
            timeout: DEFAULT_TIMEOUT_NOTICE.to_string(),
            cancelled: DEFAULT_CANCELLED_NOTICE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub request_timeout: Duration,
    pub reply_rendering: ReplyRendering,
    pub notices: Notices,
}

/// Values that came in on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub reply_rendering: Option<ReplyRendering>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley").join("config.toml"))
}

/// Load config from `~/.parley/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ParleyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ParleyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ParleyConfig::default());
        }
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<ParleyConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ParleyConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ParleyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Parley Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# endpoint = "http://localhost:8000/chat"    # Or set PARLEY_ENDPOINT
# request_timeout_secs = 120                  # Or set PARLEY_TIMEOUT_SECS
# reply_rendering = "plain_text"              # "plain_text" or "trusted_rich_text"

# [notices]
# failure = "Could not reach the server. Check that the API is running."
# timeout = "The server took too long to answer. Please try again."
# cancelled = "Request cancelled."
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ParleyConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

fn resolve_with_env(
    config: &ParleyConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Endpoint: CLI → env → config → default
    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| env("PARLEY_ENDPOINT"))
        .or_else(|| config.general.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    // Timeout: CLI → env → config → default. Zero would fail every turn.
    let timeout_secs = cli
        .timeout_secs
        .or_else(|| {
            env("PARLEY_TIMEOUT_SECS").and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(e) => {
                    warn!("Ignoring PARLEY_TIMEOUT_SECS={raw:?}: {e}");
                    None
                }
            })
        })
        .or(config.general.request_timeout_secs)
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    let reply_rendering = cli
        .reply_rendering
        .or(config.general.reply_rendering)
        .unwrap_or_default();

    let defaults = Notices::default();
    let notices = Notices {
        failure: config.notices.failure.clone().unwrap_or(defaults.failure),
        timeout: config.notices.timeout.clone().unwrap_or(defaults.timeout),
        cancelled: config
            .notices
            .cancelled
            .clone()
            .unwrap_or(defaults.cancelled),
    };

    ResolvedConfig {
        endpoint,
        request_timeout: Duration::from_secs(timeout_secs),
        reply_rendering,
        notices,
    }
}
