//! Error types and driver error classification.
//!
//! Driver failures are classified after the DB-API 2.0 categories:
//! - `Interface`: connection parameters, driver issues
//! - `Operational`: connection lost, timeout, busy database
//! - `Programming`: SQL syntax, wrong table name, bad placeholders
//! - `Integrity`: constraint violation
//! - `Data`: value conversion issues
//! - `Internal`: unexpected internal error
//!
//! Every public verb of [`Database`](crate::Database) reports failure through
//! [`Error`]; the wrapper records the message in its error state before
//! returning it.

use std::fmt;

use thiserror::Error;

/// Category of a driver-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverErrorKind {
    Interface,
    Operational,
    Programming,
    Integrity,
    Data,
    Internal,
}

impl DriverErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Interface => "InterfaceError",
            Self::Operational => "OperationalError",
            Self::Programming => "ProgrammingError",
            Self::Integrity => "IntegrityError",
            Self::Data => "DataError",
            Self::Internal => "InternalError",
        }
    }

    /// Categorize a driver message that carries no usable error code.
    #[must_use]
    pub fn from_message(msg: &str) -> Self {
        let lower = msg.to_lowercase();
        if lower.contains("connection") || lower.contains("timeout") {
            Self::Operational
        } else if lower.contains("syntax") || lower.contains("parse") {
            Self::Programming
        } else if lower.contains("constraint") || lower.contains("duplicate") {
            Self::Integrity
        } else if lower.contains("type") || lower.contains("conversion") {
            Self::Data
        } else {
            Self::Operational
        }
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a driver adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DriverError {
    kind: DriverErrorKind,
    message: String,
    code: Option<i32>,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    /// Create an interface error.
    #[must_use]
    pub fn interface(msg: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Interface, msg)
    }

    /// Create an operational error.
    #[must_use]
    pub fn operational(msg: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Operational, msg)
    }

    /// Create a programming error.
    #[must_use]
    pub fn programming(msg: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Programming, msg)
    }

    /// Create an integrity error.
    #[must_use]
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Integrity, msg)
    }

    /// Create a data error.
    #[must_use]
    pub fn data(msg: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Data, msg)
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Internal, msg)
    }

    /// Attach the native error code reported by the driver.
    #[must_use]
    pub const fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> DriverErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(DriverError),

    #[error("Prepare error: {0}")]
    Prepare(DriverError),

    #[error("Execute error: {0}")]
    Execute(DriverError),

    #[error("Fetch error: {0}")]
    Fetch(DriverError),

    #[error("Transaction error: {0}")]
    Transaction(DriverError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Specified key({0}) not found in data")]
    MissingKey(String),

    #[error("No result set")]
    EmptyResult,

    #[error("No statement has been prepared")]
    NoStatement,

    #[error("Connection is closed")]
    Closed,
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Driver error carried by this failure, if it originated in the driver.
    #[must_use]
    pub const fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Connection(e)
            | Self::Prepare(e)
            | Self::Execute(e)
            | Self::Fetch(e)
            | Self::Transaction(e) => Some(e),
            Self::InvalidArgument(_)
            | Self::MissingKey(_)
            | Self::EmptyResult
            | Self::NoStatement
            | Self::Closed => None,
        }
    }

    /// Message recorded in the wrapper's error state.
    ///
    /// Driver failures keep the driver's own message; everything else uses the
    /// display form.
    #[must_use]
    pub fn state_message(&self) -> String {
        self.driver_error()
            .map_or_else(|| self.to_string(), |e| e.message().to_string())
    }

    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    #[must_use]
    pub const fn is_prepare(&self) -> bool {
        matches!(self, Self::Prepare(_))
    }

    #[must_use]
    pub const fn is_execute(&self) -> bool {
        matches!(self, Self::Execute(_))
    }

    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    #[must_use]
    pub const fn is_missing_key(&self) -> bool {
        matches!(self, Self::MissingKey(_))
    }

    #[must_use]
    pub const fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// True for constraint violations reported by the driver.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        self.driver_error()
            .is_some_and(|e| e.kind() == DriverErrorKind::Integrity)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_constructors() {
        let err = DriverError::interface("test");
        assert_eq!(err.kind(), DriverErrorKind::Interface);

        let err = DriverError::programming("near \"SELEC\": syntax error").with_code(1);
        assert_eq!(err.kind(), DriverErrorKind::Programming);
        assert_eq!(err.code(), Some(1));
        assert_eq!(
            err.to_string(),
            "ProgrammingError: near \"SELEC\": syntax error"
        );
    }

    #[test]
    fn test_kind_from_message() {
        assert_eq!(
            DriverErrorKind::from_message("connection reset by peer"),
            DriverErrorKind::Operational
        );
        assert_eq!(
            DriverErrorKind::from_message("sql syntax error near FROM"),
            DriverErrorKind::Programming
        );
        assert_eq!(
            DriverErrorKind::from_message("unique constraint violated"),
            DriverErrorKind::Integrity
        );
        assert_eq!(
            DriverErrorKind::from_message("type conversion failed"),
            DriverErrorKind::Data
        );
        assert_eq!(
            DriverErrorKind::from_message("something odd"),
            DriverErrorKind::Operational
        );
    }

    #[test]
    fn test_state_message_keeps_driver_text() {
        let err = Error::Execute(DriverError::integrity("UNIQUE constraint failed: users.email"));
        assert_eq!(err.state_message(), "UNIQUE constraint failed: users.email");
        assert!(err.is_execute());
        assert!(err.is_integrity());
    }

    #[test]
    fn test_state_message_for_local_errors() {
        assert_eq!(Error::EmptyResult.state_message(), "No result set");
        assert_eq!(
            Error::MissingKey("uid".into()).state_message(),
            "Specified key(uid) not found in data"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(Error::invalid_argument("x").is_invalid_argument());
        assert!(Error::EmptyResult.is_empty_result());
        assert!(Error::MissingKey("id".into()).is_missing_key());
        assert!(Error::Closed.is_closed());
        assert!(Error::Prepare(DriverError::programming("x")).is_prepare());
        assert!(!Error::Closed.is_integrity());
        assert!(Error::NoStatement.driver_error().is_none());
    }
}
