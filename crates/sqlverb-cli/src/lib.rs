//! Command-line front end for the sqlverb database verbs.
//!
//! Configuration is layered env > file > CLI > defaults; see [`config`].

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod observability;

pub use error::{Error, Result};
