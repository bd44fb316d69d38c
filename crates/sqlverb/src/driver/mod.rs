//! Driver adapter boundary.
//!
//! [`Database`](crate::Database) talks to a database only through these two
//! traits. Adapters:
//! - `sqlite`: rusqlite with the bundled SQLite (feature `sqlite`)
//! - `hana`: hdbconnect for SAP HANA (feature `hana`)

#[cfg(feature = "hana")]
pub mod hana;
mod options;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use options::{ConnectOptions, ConnectOptionsBuilder};

use crate::error::DriverError;
use crate::row::{FetchMode, Row};
use crate::value::Params;

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A compiled statement owned by the caller or by the wrapper's statement slot.
pub trait DriverStatement {
    /// SQL text the statement was prepared from.
    fn query_string(&self) -> &str;

    /// Bind named parameters and run the statement.
    ///
    /// Result rows, if any, become available to the fetch methods.
    fn bind_and_execute(&mut self, params: &Params) -> DriverResult<()>;

    /// Number of output columns; zero for statements without a result set.
    fn column_count(&self) -> usize;

    fn fetch_one(&mut self, mode: FetchMode) -> DriverResult<Option<Row>>;

    fn fetch_all(&mut self, mode: FetchMode) -> DriverResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one(mode)? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rows affected by the last execution.
    fn row_count(&self) -> u64;

    /// Release pending result rows; the statement stays executable.
    fn close_cursor(&mut self);
}

/// An open connection to one database.
pub trait DriverConnection: Sized {
    type Statement: DriverStatement;

    /// Adapter name used in log events.
    const NAME: &'static str;

    fn connect(options: &ConnectOptions) -> DriverResult<Self>;

    fn prepare(&mut self, sql: &str) -> DriverResult<Self::Statement>;

    fn begin_transaction(&mut self) -> DriverResult<()>;

    fn commit(&mut self) -> DriverResult<()>;

    fn roll_back(&mut self) -> DriverResult<()>;

    /// Run a statement directly, returning the affected row count.
    fn raw_exec(&mut self, sql: &str) -> DriverResult<u64>;

    fn last_insert_id(&mut self) -> DriverResult<String>;
}
