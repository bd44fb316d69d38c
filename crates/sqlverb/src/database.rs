//! The verb wrapper around one driver connection.
//!
//! [`Database`] owns a connection and a single current-statement slot. Each
//! verb returns a [`Result`]; on failure it also records the message in the
//! instance [`ErrorState`] and emits a diagnostic record. The error state is
//! cleared at the start of every [`Database::prepare`].

use std::fmt;

use indexmap::IndexMap;

use crate::diagnostics::{self, DiagnosticsConfig, ErrorState};
use crate::driver::{ConnectOptions, DriverConnection, DriverResult, DriverStatement};
use crate::error::{DriverError, Error, Result};
use crate::row::{FetchMode, Row};
use crate::sql::{
    DmlOperation, KeyColumns, ShapeToken, SqlCache, SqlCacheKey, delete_sql, insert_sql,
    update_sql,
};
use crate::value::{Params, RowKey, Value};

enum ConnectionState<C> {
    Connected(C),
    Closed,
}

/// Convenience verbs over a driver connection.
pub struct Database<C: DriverConnection> {
    connection: ConnectionState<C>,
    statement: Option<C::Statement>,
    sql_cache: SqlCache,
    error: ErrorState,
    diagnostics: DiagnosticsConfig,
}

impl<C: DriverConnection> fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &C::NAME)
            .field("connected", &self.is_connected())
            .field(
                "statement",
                &self.statement.as_ref().map(DriverStatement::query_string),
            )
            .field("sql_cache", &self.sql_cache)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<C: DriverConnection> Database<C> {
    pub fn connect(options: &ConnectOptions) -> Result<Self> {
        Self::connect_with(options, DiagnosticsConfig::default())
    }

    pub fn connect_with(options: &ConnectOptions, diagnostics: DiagnosticsConfig) -> Result<Self> {
        match C::connect(options) {
            Ok(conn) => {
                tracing::info!(driver = C::NAME, dsn = %options.redacted_dsn(), "connected");
                Ok(Self::from_connection(conn, diagnostics))
            }
            Err(e) => {
                let err = Error::Connection(e);
                diagnostics::emit(diagnostics, &err.state_message(), None, None);
                Err(err)
            }
        }
    }

    /// Wrap an already open driver connection.
    pub fn from_connection(conn: C, diagnostics: DiagnosticsConfig) -> Self {
        Self {
            connection: ConnectionState::Connected(conn),
            statement: None,
            sql_cache: SqlCache::new(),
            error: ErrorState::default(),
            diagnostics,
        }
    }

    pub const fn has_error(&self) -> bool {
        self.error.has_error()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.last_error()
    }

    pub const fn error_state(&self) -> &ErrorState {
        &self.error
    }

    pub const fn sql_cache(&self) -> &SqlCache {
        &self.sql_cache
    }

    pub const fn diagnostics(&self) -> DiagnosticsConfig {
        self.diagnostics
    }

    pub const fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected(_))
    }

    /// The current statement, if one has been prepared.
    pub const fn statement(&self) -> Option<&C::Statement> {
        self.statement.as_ref()
    }

    /// Record a failure, emit its diagnostic and return it.
    ///
    /// Without an explicit `sql` the diagnostic carries the current
    /// statement's text.
    fn fail<T>(&mut self, err: Error, sql: Option<&str>, params: Option<&Params>) -> Result<T> {
        let message = err.state_message();
        self.error.set(message.as_str());
        let sql = sql.or_else(|| self.statement.as_ref().map(DriverStatement::query_string));
        diagnostics::emit(self.diagnostics, &message, sql, params);
        Err(err)
    }

    const fn no_statement(&self) -> Error {
        if self.is_connected() {
            Error::NoStatement
        } else {
            Error::Closed
        }
    }

    fn with_connection<T, F>(
        &mut self,
        wrap: fn(DriverError) -> Error,
        sql: Option<&str>,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut C) -> DriverResult<T>,
    {
        let result = match &mut self.connection {
            ConnectionState::Connected(conn) => f(conn).map_err(wrap),
            ConnectionState::Closed => Err(Error::Closed),
        };
        result.or_else(|err| self.fail(err, sql, None))
    }

    /// Compile `sql` into the current statement slot.
    ///
    /// Clears the error state. The previous statement is discarded whether or
    /// not compilation succeeds.
    pub fn prepare(&mut self, sql: &str) -> Result<()> {
        self.error.clear();
        self.statement = None;
        let stmt = self.with_connection(Error::Prepare, Some(sql), |conn| conn.prepare(sql))?;
        tracing::debug!(sql, "prepared");
        self.statement = Some(stmt);
        Ok(())
    }

    /// Compile `sql` into a statement owned by the caller.
    ///
    /// The current statement slot is left untouched.
    pub fn prepare_detached(&mut self, sql: &str) -> Result<C::Statement> {
        self.error.clear();
        let stmt = self.with_connection(Error::Prepare, Some(sql), |conn| conn.prepare(sql))?;
        tracing::debug!(sql, detached = true, "prepared");
        Ok(stmt)
    }

    /// Bind `params` to the current statement and run it. Nothing is fetched.
    pub fn execute(&mut self, params: &Params) -> Result<()> {
        let Some(stmt) = self.statement.as_mut() else {
            return self.fail(self.no_statement(), None, Some(params));
        };

        let result = stmt.bind_and_execute(params);
        match result {
            Ok(()) => {
                tracing::debug!(sql = stmt.query_string(), params = params.len(), "executed");
                Ok(())
            }
            Err(e) => self.fail(Error::Execute(e), None, Some(params)),
        }
    }

    fn prepex(&mut self, sql: &str, params: &Params) -> Result<()> {
        self.prepare(sql)?;
        self.execute(params)
    }

    /// Prepare and execute `sql`, returning the affected row count.
    pub fn exec(&mut self, sql: &str, params: &Params) -> Result<u64> {
        self.prepex(sql, params)?;
        let affected = self.statement.as_ref().map_or(0, DriverStatement::row_count);
        self.finish();
        Ok(affected)
    }

    /// Execute the current statement and fetch every row.
    pub fn exec_all(&mut self, params: &Params, mode: FetchMode) -> Result<Vec<Row>> {
        self.execute(params)?;
        self.fetch_all(mode)
    }

    /// All remaining rows of the current statement, then finish.
    ///
    /// A statement without output columns yields an empty vector.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Result<Vec<Row>> {
        let Some(stmt) = self.statement.as_mut() else {
            return self.fail(self.no_statement(), None, None);
        };

        let rows = if stmt.column_count() > 0 {
            stmt.fetch_all(mode)
        } else {
            Ok(Vec::new())
        };
        match rows {
            Ok(rows) => {
                stmt.close_cursor();
                Ok(rows)
            }
            Err(e) => self.fail(Error::Fetch(e), None, None),
        }
    }

    /// Next row of the current statement. The cursor stays open.
    pub fn fetch(&mut self, mode: FetchMode) -> Result<Option<Row>> {
        let Some(stmt) = self.statement.as_mut() else {
            return self.fail(self.no_statement(), None, None);
        };
        let row = stmt.fetch_one(mode);
        row.or_else(|e| self.fail(Error::Fetch(e), None, None))
    }

    /// First row of the current statement, then finish.
    fn fetch_first(&mut self, mode: FetchMode) -> Result<Option<Row>> {
        let row = self.fetch(mode)?;
        self.finish();
        Ok(row)
    }

    /// Prepare and execute, handing back the live statement.
    ///
    /// The caller consumes it and calls [`finish`](Self::finish).
    pub fn query(&mut self, sql: &str, params: &Params) -> Result<&mut C::Statement> {
        self.prepex(sql, params)?;
        self.statement.as_mut().ok_or(Error::NoStatement)
    }

    pub fn query_all(&mut self, sql: &str, params: &Params, mode: FetchMode) -> Result<Vec<Row>> {
        self.prepex(sql, params)?;
        self.fetch_all(mode)
    }

    /// First column of every row.
    pub fn query_col(&mut self, sql: &str, params: &Params) -> Result<Vec<Value>> {
        let rows = self.query_all(sql, params, FetchMode::Num)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_values().into_iter().next().unwrap_or_default())
            .collect())
    }

    /// First column of the first row; `None` when there is no row.
    pub fn query_one(&mut self, sql: &str, params: &Params) -> Result<Option<Value>> {
        self.prepex(sql, params)?;
        let row = self.fetch_first(FetchMode::Num)?;
        Ok(row.and_then(|row| row.into_values().into_iter().next()))
    }

    pub fn query_row(
        &mut self,
        sql: &str,
        params: &Params,
        mode: FetchMode,
    ) -> Result<Option<Row>> {
        self.prepex(sql, params)?;
        self.fetch_first(mode)
    }

    /// All rows keyed by the value of column `key`.
    ///
    /// A later row whose key equals an earlier one replaces it; the entry
    /// keeps the position of the first occurrence.
    pub fn query_obj(
        &mut self,
        sql: &str,
        key: &str,
        params: &Params,
    ) -> Result<IndexMap<RowKey, Row>> {
        if key.is_empty() {
            return self.fail(
                Error::invalid_argument("No key specified"),
                Some(sql),
                Some(params),
            );
        }

        let rows = self.query_all(sql, params, FetchMode::Assoc)?;
        let Some(first) = rows.first() else {
            return self.fail(Error::EmptyResult, None, Some(params));
        };
        if !first.contains_column(key) {
            return self.fail(Error::MissingKey(key.to_string()), None, Some(params));
        }

        let mut obj = IndexMap::with_capacity(rows.len());
        for row in rows {
            let row_key = row
                .get(key)
                .map_or_else(|| RowKey::Text(String::new()), RowKey::from);
            obj.insert(row_key, row);
        }
        Ok(obj)
    }

    /// Close the current statement's cursor. No-op without a statement.
    pub fn finish(&mut self) {
        if let Some(stmt) = self.statement.as_mut() {
            stmt.close_cursor();
        }
    }

    /// Release the statement and the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.statement = None;
        if let ConnectionState::Connected(_) =
            std::mem::replace(&mut self.connection, ConnectionState::Closed)
        {
            tracing::info!(driver = C::NAME, "connection closed");
        }
    }

    /// Insert one row; the columns are the keys of `data`.
    pub fn insert(&mut self, table: &str, data: &Params) -> Result<u64> {
        if data.is_empty() {
            return self.fail(
                Error::invalid_argument("Data must be provided for insert"),
                None,
                None,
            );
        }

        let columns: Vec<&str> = data.columns().collect();
        let key = SqlCacheKey::new(
            DmlOperation::Insert,
            table,
            ShapeToken::from_columns(columns.iter().copied()),
        );
        let sql = self
            .sql_cache
            .get_or_insert_with(key, || insert_sql(table, &columns));
        self.exec(&sql, data)
    }

    /// Update the rows matching `keys`; every other column of `data` is set.
    pub fn update(
        &mut self,
        table: &str,
        data: &Params,
        keys: impl Into<KeyColumns>,
    ) -> Result<u64> {
        let keys = keys.into();
        if data.is_empty() {
            return self.fail(
                Error::invalid_argument("Data must be provided for update"),
                None,
                None,
            );
        }
        if keys.is_empty() {
            return self.fail(
                Error::invalid_argument("No key column specified for update"),
                None,
                Some(data),
            );
        }

        let columns: Vec<&str> = data.columns().collect();
        if columns.iter().all(|col| keys.contains(col)) {
            return self.fail(
                Error::invalid_argument("No columns left to update after removing key columns"),
                None,
                Some(data),
            );
        }

        let key = SqlCacheKey::new(
            DmlOperation::Update,
            table,
            ShapeToken::with_keys(columns.iter().copied(), keys.iter()),
        );
        let sql = self
            .sql_cache
            .get_or_insert_with(key, || update_sql(table, &columns, &keys));
        self.exec(&sql, data)
    }

    /// [`update`](Self::update) keyed on the `id` column.
    pub fn update_by_id(&mut self, table: &str, data: &Params) -> Result<u64> {
        self.update(table, data, KeyColumns::default())
    }

    /// Delete the rows matching every column of `data`.
    pub fn delete(&mut self, table: &str, data: &Params) -> Result<u64> {
        if data.is_empty() {
            return self.fail(
                Error::invalid_argument("Data must be provided for delete"),
                None,
                None,
            );
        }

        let columns: Vec<&str> = data.columns().collect();
        let key = SqlCacheKey::new(
            DmlOperation::Delete,
            table,
            ShapeToken::from_columns(columns.iter().copied()),
        );
        let sql = self
            .sql_cache
            .get_or_insert_with(key, || delete_sql(table, &columns));
        self.exec(&sql, data)
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.with_connection(Error::Transaction, None, DriverConnection::begin_transaction)?;
        tracing::debug!("transaction started");
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.with_connection(Error::Transaction, None, DriverConnection::commit)?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    pub fn roll_back(&mut self) -> Result<()> {
        self.with_connection(Error::Transaction, None, DriverConnection::roll_back)?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }

    /// Run `sql` directly on the connection, bypassing the statement slot.
    pub fn t_exec(&mut self, sql: &str) -> Result<u64> {
        self.with_connection(Error::Transaction, Some(sql), |conn| conn.raw_exec(sql))
    }

    pub fn last_insert_id(&mut self) -> Result<String> {
        self.with_connection(Error::Execute, None, DriverConnection::last_insert_id)
    }
}

impl<C: DriverConnection> Drop for Database<C> {
    fn drop(&mut self) {
        self.close();
    }
}
