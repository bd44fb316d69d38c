//! Instance error state and the diagnostic record emitted on every failure.

use std::backtrace::Backtrace;

use crate::value::Params;

/// Controls what a failure diagnostic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Emit a call-stack snapshot with every failure.
    pub capture_backtrace: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            capture_backtrace: true,
        }
    }
}

impl DiagnosticsConfig {
    #[must_use]
    pub const fn with_backtrace(mut self, enabled: bool) -> Self {
        self.capture_backtrace = enabled;
        self
    }
}

/// Failure flag and message of the most recent failed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    has_error: bool,
    last_error: Option<String>,
}

impl ErrorState {
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.has_error
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reset the flag. The last message is kept for inspection.
    pub const fn clear(&mut self) {
        self.has_error = false;
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.last_error = Some(message.into());
    }
}

/// Emit the diagnostic record for a failure.
///
/// One WARN event with the message and the active SQL, a second WARN event
/// with the backtrace when enabled, and the bound parameters as JSON.
pub(crate) fn emit(
    config: DiagnosticsConfig,
    message: &str,
    sql: Option<&str>,
    params: Option<&Params>,
) {
    match sql {
        Some(sql) => tracing::warn!(error = %message, sql = %sql, "{message} SQL: {sql}"),
        None => tracing::warn!(error = %message, "{message}"),
    }

    if config.capture_backtrace {
        let backtrace = Backtrace::force_capture();
        tracing::warn!(backtrace = %backtrace, "call stack at failure");
    }

    if let Some(params) = params {
        match serde_json::to_string(params) {
            Ok(json) => tracing::warn!(params = %json, "bound parameters"),
            Err(e) => tracing::warn!(error = %e, "bound parameters could not be serialized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_state_set_and_clear() {
        let mut state = ErrorState::default();
        assert!(!state.has_error());
        assert_eq!(state.last_error(), None);

        state.set("boom");
        assert!(state.has_error());
        assert_eq!(state.last_error(), Some("boom"));

        state.set("second");
        assert_eq!(state.last_error(), Some("second"));

        state.clear();
        assert!(!state.has_error());
        assert_eq!(state.last_error(), Some("second"));
    }

    #[test]
    fn test_diagnostics_config_default_captures_backtrace() {
        assert!(DiagnosticsConfig::default().capture_backtrace);
        assert!(!DiagnosticsConfig::default().with_backtrace(false).capture_backtrace);
    }

    #[test]
    fn test_emit_without_subscriber_does_not_panic() {
        let params = Params::new().with("id", 1);
        emit(
            DiagnosticsConfig::default().with_backtrace(false),
            "failed",
            Some("SELECT 1"),
            Some(&params),
        );
        emit(DiagnosticsConfig::default(), "failed", None, None);
    }
}
