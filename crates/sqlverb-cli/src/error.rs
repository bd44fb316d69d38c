//! Error types for the command-line front end

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Database(#[from] sqlverb::Error),

    #[error("Unsupported DSN scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    #[must_use]
    pub const fn is_database(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
