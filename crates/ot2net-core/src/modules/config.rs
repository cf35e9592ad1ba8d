//! Gateway configuration loading and persistence.

use ot2net_types::{ConfigError, GatewayConfig};
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

const CONFIG_FILE: &str = "config.json";

pub const ENV_UPSTREAM_URL: &str = "OT2NET_UPSTREAM_URL";
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_RATE_WINDOW_MS: &str = "OT2NET_RATE_WINDOW_MS";
pub const ENV_RATE_MAX_REQUESTS: &str = "OT2NET_RATE_MAX_REQUESTS";

/// Resolve the config file path: an explicit path wins, else `<data_dir>/config.json`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_config_path(explicit, crate::utils::paths::get_data_dir)
}

fn resolve_config_path(
    explicit: Option<&Path>,
    data_dir: impl FnOnce() -> Result<PathBuf, String>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let data_dir = data_dir().map_err(|message| ConfigError::DataDirUnavailable { message })?;
    Ok(data_dir.join(CONFIG_FILE))
}

/// Load configuration: defaults, then the JSON file, then the process environment.
///
/// A missing default file is not an error; a missing explicit file is.
pub fn load_config(explicit: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let path = config_path(explicit)?;
    let config = if path.exists() {
        read_config_file(&path)?
    } else if explicit.is_some() {
        return Err(ConfigError::NotFound { path: path.display().to_string() });
    } else {
        GatewayConfig::default()
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    validate_config(&config)?;
    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))
}

/// Apply environment overrides. Unparseable values are logged and skipped.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_UPSTREAM_URL) {
        let origin = raw.trim().trim_end_matches('/').to_string();
        if url::Url::parse(&origin).is_ok() {
            config.edge.upstream_origin = origin;
        } else {
            tracing::warn!(var = ENV_UPSTREAM_URL, value = %raw, "Ignoring invalid URL");
        }
    }

    if let Some(key) = lookup(ENV_API_KEY) {
        let key = key.trim();
        if !key.is_empty() {
            config.anthropic.api_key = key.to_string();
        }
    }

    if let Some(raw) = lookup(ENV_RATE_WINDOW_MS) {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => config.rate_limit.window_ms = ms,
            _ => tracing::warn!(var = ENV_RATE_WINDOW_MS, value = %raw, "Ignoring invalid window"),
        }
    }

    if let Some(raw) = lookup(ENV_RATE_MAX_REQUESTS) {
        match raw.trim().parse::<u32>() {
            Ok(max) if max > 0 => config.rate_limit.max_requests = max,
            _ => {
                tracing::warn!(var = ENV_RATE_MAX_REQUESTS, value = %raw, "Ignoring invalid limit")
            },
        }
    }

    config
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|e| ConfigError::from_validation(&e))
}

/// Persist configuration atomically (temp file + rename). The API key is never written.
pub fn save_config(config: &GatewayConfig, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    validate_config(config)?;
    let path = config_path(explicit)?;
    let temp_path = path.with_extension("json.tmp");

    let content = serde_json::to_string_pretty(config).map_err(|e| ConfigError::WriteError {
        message: format!("Failed to serialize config: {}", e),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::from_io_error(&e))?;
        }
    }
    fs::write(&temp_path, content).map_err(|e| ConfigError::from_io_error(&e))?;
    fs::rename(&temp_path, &path).map_err(|e| ConfigError::from_io_error(&e))?;
    Ok(path)
}
