//! Prepare/execute/fetch verbs over relational database drivers.
//!
//! [`Database`] wraps one driver connection and a single current-statement
//! slot behind a small set of verbs (`exec`, `query_all`, `query_one`,
//! `query_obj`, …). Row-level `insert`, `update` and `delete` generate their
//! SQL from the shape of the supplied data and cache it per table and shape.
//!
//! # Features
//!
//! - `sqlite` (default): SQLite adapter backed by `rusqlite`
//! - `hana`: SAP HANA adapter backed by `hdbconnect`
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> sqlverb::Result<()> {
//! use sqlverb::{Database, FetchMode, SqliteConnection, params};
//!
//! let mut db = Database::<SqliteConnection>::open_in_memory()?;
//! db.t_exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//! db.insert("users", &params! { "name" => "Ann" })?;
//!
//! let name = db.query_one("SELECT name FROM users WHERE id = :id", &params! { "id" => 1 })?;
//! assert_eq!(name.as_ref().and_then(|v| v.as_str()), Some("Ann"));
//!
//! let rows = db.query_all("SELECT id, name FROM users", &params! {}, FetchMode::Assoc)?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

mod database;
pub mod diagnostics;
pub mod driver;
mod error;
mod row;
pub mod sql;
mod value;

pub use database::Database;
pub use diagnostics::{DiagnosticsConfig, ErrorState};
#[cfg(feature = "hana")]
pub use driver::hana::{HanaConnection, HanaStatement};
#[cfg(feature = "sqlite")]
pub use driver::sqlite::{SqliteConnection, SqliteStatement};
pub use driver::{ConnectOptions, ConnectOptionsBuilder, DriverConnection, DriverStatement};
pub use error::{DriverError, DriverErrorKind, Error, Result};
pub use row::{FetchMode, Row};
pub use sql::{KeyColumns, SqlCache};
pub use value::{Params, RowKey, Value};
