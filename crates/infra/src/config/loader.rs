//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file from the working directory, if present
//! 2. Uses environment variables when `LINKSCOUT_BASE_URL` is set
//! 3. Otherwise probes multiple paths for a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LINKSCOUT_BASE_URL`: Root resource of the API (required)
//! - `LINKSCOUT_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `LINKSCOUT_ACTION_METHOD`: HTTP method used by `take_action`
//! - `LINKSCOUT_INSECURE_TLS`: Accept invalid certificates (true/false)
//! - `LINKSCOUT_AUTH_TOKEN`: Bearer token sent with every request
//! - `LINKSCOUT_USER_AGENT`: User-Agent header
//! - `LINKSCOUT_BOOTSTRAP_MAX_WAIT_MS`: Give up waiting for links after this
//!   long
//! - `LINKSCOUT_LOG_LEVEL`: Log filter directive (e.g. `info`,
//!   `linkscout=debug`)
//! - `LINKSCOUT_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./linkscout.toml` or `./linkscout.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use linkscout_domain::constants::DEFAULT_TIMEOUT_MS;
use linkscout_domain::{ClientConfig, ClientError, Result};
use url::Url;

use crate::errors::InfraError;

const BASE_URL_VAR: &str = "LINKSCOUT_BASE_URL";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["linkscout.toml", "linkscout.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `LINKSCOUT_BASE_URL` is set; otherwise the
/// configuration is read from the first config file found.
///
/// # Errors
/// Returns `ClientError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    if std::env::var_os(BASE_URL_VAR).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!("{BASE_URL_VAR} not set, trying config file");
    load_from_file(None)
}

/// Load configuration from environment variables
///
/// Only `LINKSCOUT_BASE_URL` is required; every other setting falls back to
/// its default.
///
/// # Errors
/// Returns `ClientError::Config` if the base URL is missing or any variable
/// has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let base_url = Url::parse(&env_var(BASE_URL_VAR)?).map_err(InfraError::from)?;

    let mut config = ClientConfig::new(base_url, Duration::from_millis(DEFAULT_TIMEOUT_MS));

    if let Some(timeout_ms) = env_parse::<u64>("LINKSCOUT_TIMEOUT_MS")? {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(method) = env_opt("LINKSCOUT_ACTION_METHOD") {
        config.action_method = method;
    }
    config.insecure_tls = env_bool("LINKSCOUT_INSECURE_TLS", false);
    config.auth_token = env_opt("LINKSCOUT_AUTH_TOKEN");
    config.user_agent = env_opt("LINKSCOUT_USER_AGENT");

    if let Some(max_wait_ms) = env_parse::<u64>("LINKSCOUT_BOOTSTRAP_MAX_WAIT_MS")? {
        config.bootstrap.max_wait = Some(Duration::from_millis(max_wait_ms));
    }

    if let Some(level) = env_opt("LINKSCOUT_LOG_LEVEL") {
        config.log.level = level;
    }
    config.log.json = env_bool("LINKSCOUT_LOG_JSON", false);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ClientError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or a value fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClientError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ClientError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClientError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse and validate configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ClientError::Config` if the format is unsupported, parsing fails
/// or the parsed configuration is invalid.
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: ClientConfig = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from)?,
        "json" => serde_json::from_str(contents).map_err(InfraError::from)?,
        _ => {
            return Err(ClientError::Config(format!("Unsupported config format: {extension}")))
        }
    };

    config.validate()?;
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.is_file())
}

/// Get required environment variable
///
/// # Errors
/// Returns `ClientError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ClientError::Config(format!("Missing required environment variable: {key}")))
}

/// Non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ClientError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
