//! Environment variable loading for configuration

use std::env;

use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;

/// Environment variable names
mod vars {
    pub const SQLVERB_DSN: &str = "SQLVERB_DSN";
    pub const SQLVERB_USER: &str = "SQLVERB_USER";
    pub const SQLVERB_PASSWORD: &str = "SQLVERB_PASSWORD";
    pub const SQLVERB_BACKTRACE: &str = "SQLVERB_BACKTRACE";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const SQLVERB_JSON_LOGS: &str = "SQLVERB_JSON_LOGS";
}

/// Load configuration from environment variables
pub fn load_from_env(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Ok(dsn) = env::var(vars::SQLVERB_DSN) {
        let url = Url::parse(&dsn)
            .map_err(|e| crate::Error::Config(format!("Invalid {}: {e}", vars::SQLVERB_DSN)))?;
        builder = builder.dsn(url);
    }

    // Credentials apply even when the DSN comes from elsewhere
    if let Ok(user) = env::var(vars::SQLVERB_USER) {
        builder = builder.user(user);
    }
    if let Ok(password) = env::var(vars::SQLVERB_PASSWORD) {
        builder = builder.password(password);
    }

    if let Ok(value) = env::var(vars::SQLVERB_BACKTRACE) {
        builder = builder.capture_backtrace(parse_bool(&value));
    }

    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(value) = env::var(vars::SQLVERB_JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&value));
    }

    Ok(builder)
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
