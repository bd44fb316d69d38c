//! Configuration builder

use sqlverb::{ConnectOptions, DiagnosticsConfig};
use url::Url;

use crate::Error;

/// Resolved CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub diagnostics: DiagnosticsConfig,
    pub telemetry: TelemetryConfig,
}

impl Config {
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Driver options for the configured connection.
    pub fn connect_options(&self) -> crate::Result<ConnectOptions> {
        let mut builder = ConnectOptions::builder().dsn(self.connection.dsn.clone());
        if let Some(user) = &self.connection.user {
            builder = builder.user(user.clone());
        }
        if let Some(password) = &self.connection.password {
            builder = builder.password(password.clone());
        }
        Ok(builder.build()?)
    }
}

/// Where and as whom to connect
#[derive(Clone)]
pub struct ConnectionConfig {
    pub dsn: Url,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dsn", &self.dsn.as_str())
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    dsn: Option<Url>,
    user: Option<String>,
    password: Option<String>,
    diagnostics: DiagnosticsConfig,
    telemetry: TelemetryConfig,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    const DEFAULT_LOG_LEVEL: &'static str = "warn";

    #[must_use]
    pub const fn new() -> Self {
        Self {
            dsn: None,
            user: None,
            password: None,
            diagnostics: DiagnosticsConfig {
                capture_backtrace: true,
            },
            telemetry: TelemetryConfig {
                log_level: String::new(),
                json_logs: false,
            },
        }
    }

    #[must_use]
    pub fn dsn(mut self, dsn: Url) -> Self {
        self.dsn = Some(dsn);
        self
    }

    /// Parse and set the DSN.
    pub fn dsn_str(self, dsn: &str) -> crate::Result<Self> {
        let url = Url::parse(dsn).map_err(|e| Error::Config(format!("Invalid DSN: {e}")))?;
        Ok(self.dsn(url))
    }

    #[must_use]
    pub fn user(mut self, user: String) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn password(mut self, password: String) -> Self {
        self.password = Some(password);
        self
    }

    #[must_use]
    pub const fn capture_backtrace(mut self, enabled: bool) -> Self {
        self.diagnostics = self.diagnostics.with_backtrace(enabled);
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    pub fn build(self) -> crate::Result<Config> {
        let dsn = self
            .dsn
            .ok_or_else(|| Error::Config("Connection DSN is required".to_string()))?;

        let mut telemetry = self.telemetry;
        if telemetry.log_level.is_empty() {
            telemetry.log_level = Self::DEFAULT_LOG_LEVEL.to_string();
        }

        Ok(Config {
            connection: ConnectionConfig {
                dsn,
                user: self.user,
                password: self.password,
            },
            diagnostics: self.diagnostics,
            telemetry,
        })
    }
}
