//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > CLI > defaults

mod builder;
mod env;
mod file;

use std::path::Path;

pub use builder::{Config, ConfigBuilder, ConnectionConfig, TelemetryConfig};

use crate::Result;

/// Layer the first config file found and then the environment over `builder`.
///
/// `builder` carries the CLI arguments, so both sources override them.
pub fn load_config(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    env::load_from_env(builder)
}

/// Like [`load_config`] with an explicit config file path.
pub fn load_config_from_path(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let builder = file::load_from_file(path, builder)?;
    env::load_from_env(builder)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::env::test_support::with_env_vars;
    use super::*;

    #[test]
    fn test_load_config_no_file() {
        with_env_vars(&[], || {
            // Fails only at build() when no source supplies a DSN
            assert!(load_config(ConfigBuilder::new()).is_ok());
        });
    }

    #[test]
    fn test_precedence_env_over_file_over_cli() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[connection]\ndsn = \"sqlite:/from/file.db\"\n")
            .unwrap();
        file.write_all(b"\n[observability]\nlog_level = \"info\"\n")
            .unwrap();
        file.flush().unwrap();

        let cli = ConfigBuilder::new()
            .dsn_str("sqlite:/from/cli.db")
            .unwrap()
            .log_level("debug".to_string())
            .json_logs(true);

        with_env_vars(&[("SQLVERB_DSN", "sqlite:/from/env.db")], || {
            let config = load_config_from_path(file.path(), cli)
                .unwrap()
                .build()
                .unwrap();

            assert_eq!(config.connection.dsn.path(), "/from/env.db");
            assert_eq!(config.telemetry.log_level, "info");
            // Untouched by file and env
            assert!(config.telemetry.json_logs);
        });
    }
}
