//! TOML configuration file loading

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./sqlverb.toml",
    "~/.config/sqlverb/config.toml",
    "/etc/sqlverb/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_PATHS.iter().find_map(|path_str| {
        let path = if path_str.starts_with('~') {
            let home = std::env::var("HOME").ok()?;
            PathBuf::from(path_str.replacen('~', &home, 1))
        } else {
            PathBuf::from(path_str)
        };
        path.exists().then_some(path)
    })
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(builder, file_config)
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig) -> Result<ConfigBuilder> {
    if let Some(conn) = config.connection {
        if let Some(dsn) = conn.dsn {
            let url = Url::parse(&dsn)
                .map_err(|e| crate::Error::Config(format!("Invalid connection DSN: {e}")))?;
            builder = builder.dsn(url);
        }
        if let Some(user) = conn.user {
            builder = builder.user(user);
        }
        if let Some(password) = conn.password {
            builder = builder.password(password);
        }
    }

    if let Some(diag) = config.diagnostics
        && let Some(enabled) = diag.capture_backtrace
    {
        builder = builder.capture_backtrace(enabled);
    }

    if let Some(obs) = config.observability {
        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }
        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    Ok(builder)
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    connection: Option<ConnectionSection>,
    diagnostics: Option<DiagnosticsSection>,
    observability: Option<ObservabilitySection>,
}

#[derive(Debug, Deserialize)]
struct ConnectionSection {
    dsn: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiagnosticsSection {
    capture_backtrace: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ObservabilitySection {
    log_level: Option<String>,
    json_logs: Option<bool>,
}
