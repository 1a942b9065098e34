//! Configuration loading and validation.
//!
//! The config file is JSON5 (comments and trailing commas permitted) and must
//! be readable by the owner only: credentials live in it in plaintext, so a
//! group- or world-readable file is rejected outright.

use crate::error::GateError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Key names whose string values are treated as secrets everywhere in the
/// config tree: collected for log masking, and length-checked at load time.
///
/// Plugin configs that want additional fields masked must use one of these
/// names.
pub const SECRET_KEYS: &[&str] = &[
    "token",
    "keyring_password",
    "client_secret",
    "refresh_token",
    "password",
];

/// Secrets shorter than this are rejected at load time. Masking works by
/// literal substring replacement, so a very short secret would collide with
/// benign log text.
pub const MIN_SECRET_LEN: usize = 8;

/// Top-level configuration for the Toolgate proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Listen port; overridable by the `--port` flag.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub timeouts: Timeouts,

    /// Plugin name to plugin-specific config. Only plugins whose name
    /// appears here are instantiated; each plugin deserializes its own
    /// section.
    #[serde(default)]
    pub plugins: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    /// Total timeout for outbound HTTP calls (seconds).
    #[serde(default = "default_http_timeout")]
    pub http: u64,

    /// Deadline for CLI subprocesses (seconds).
    #[serde(default = "default_cli_timeout")]
    pub cli: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            http: default_http_timeout(),
            cli: default_cli_timeout(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}

fn default_cli_timeout() -> u64 {
    60
}

impl ProxyConfig {
    /// Load configuration from a JSON5 file.
    ///
    /// Fatal conditions: missing file, permissions open to group/other,
    /// invalid JSON5, structural violations, or a too-short secret value.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        if !path.is_file() {
            return Err(GateError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        check_permissions(path)?;

        let text = std::fs::read_to_string(path)?;
        let raw: Value = json5::from_str(&text).map_err(|e| {
            GateError::Config(format!("Invalid JSON5 in {}: {}", path.display(), e))
        })?;

        validate(&raw)?;

        let config: ProxyConfig = serde_json::from_value(raw)
            .map_err(|e| GateError::Config(format!("Invalid config structure: {e}")))?;
        Ok(config)
    }

    /// Plugin section by name, or an empty object when absent.
    pub fn plugin_config(&self, name: &str) -> Value {
        self.plugins
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<(), GateError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(GateError::Config(format!(
            "Config file {} has too-open permissions ({:#o}). Run: chmod 600 {}",
            path.display(),
            mode,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Result<(), GateError> {
    Ok(())
}

/// Structural validation over the raw tree, before typed extraction.
fn validate(raw: &Value) -> Result<(), GateError> {
    let root = raw
        .as_object()
        .ok_or_else(|| GateError::Config("Config must be a JSON object".into()))?;

    if let Some(plugins) = root.get("plugins") {
        let plugins = plugins
            .as_object()
            .ok_or_else(|| GateError::Config("'plugins' must be an object".into()))?;
        for (name, plugin_config) in plugins {
            validate_plugin_config(name, plugin_config)?;
        }
    }

    validate_secret_lengths(raw)
}

fn validate_plugin_config(name: &str, plugin_config: &Value) -> Result<(), GateError> {
    let obj = plugin_config.as_object().ok_or_else(|| {
        GateError::Config(format!("Plugin config '{name}' must be an object"))
    })?;

    let Some(credentials) = obj.get("credentials") else {
        return Ok(());
    };
    let credentials = credentials.as_array().ok_or_else(|| {
        GateError::Config(format!("Plugin '{name}' credentials must be an array"))
    })?;

    for (i, cred) in credentials.iter().enumerate() {
        let cred = cred.as_object().ok_or_else(|| {
            GateError::Config(format!("Plugin '{name}' credential {i} must be an object"))
        })?;
        let resources = cred.get("resources").ok_or_else(|| {
            GateError::Config(format!("Plugin '{name}' credential {i} missing 'resources'"))
        })?;
        if !resources.is_array() {
            return Err(GateError::Config(format!(
                "Plugin '{name}' credential {i} 'resources' must be an array"
            )));
        }
    }
    Ok(())
}

/// Reject secrets too short to mask safely (see [`MIN_SECRET_LEN`]).
fn validate_secret_lengths(value: &Value) -> Result<(), GateError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if SECRET_KEYS.contains(&key.as_str()) {
                    if let Value::String(s) = child {
                        if !s.is_empty() && s.len() < MIN_SECRET_LEN {
                            return Err(GateError::Config(format!(
                                "Secret value for '{key}' is too short \
                                 ({} chars, minimum {MIN_SECRET_LEN})",
                                s.len()
                            )));
                        }
                        continue;
                    }
                }
                validate_secret_lengths(child)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                validate_secret_lengths(item)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
