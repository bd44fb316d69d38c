//! SQLite adapter backed by rusqlite.
//!
//! DSNs: `sqlite::memory:`, `sqlite:relative.db`, `sqlite:/abs/path.db`.
//! The DSN path is percent-decoded, so `sqlite:my%20db.sqlite` opens
//! `my db.sqlite`.
//! Options (DSN query or [`ConnectOptions::option`]):
//! - `path`: database file, taken verbatim in place of the DSN path
//! - `mode`: `ro`, `rw`, or `rwc` (default)
//! - `busy_timeout`: milliseconds to wait on a locked database
//!
//! Result rows are materialized when the statement executes; fetches then
//! drain the buffer.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{ErrorCode, OpenFlags, ToSql};

use super::{ConnectOptions, DriverConnection, DriverResult, DriverStatement};
use crate::database::Database;
use crate::error::{DriverError, DriverErrorKind, Error, Result};
use crate::row::{FetchMode, Row};
use crate::value::{Params, Value};

const MEMORY_PATH: &str = ":memory:";
const PATH_OPTION: &str = "path";

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        let msg = err.to_string();
        if let Some(failure) = err.sqlite_error() {
            let kind = match failure.code {
                ErrorCode::ConstraintViolation => DriverErrorKind::Integrity,
                ErrorCode::TypeMismatch | ErrorCode::TooBig => DriverErrorKind::Data,
                ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied => {
                    DriverErrorKind::Interface
                }
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly => DriverErrorKind::Operational,
                ErrorCode::Unknown | ErrorCode::ParameterOutOfRange => DriverErrorKind::Programming,
                ErrorCode::ApiMisuse | ErrorCode::InternalMalfunction => DriverErrorKind::Internal,
                _ => DriverErrorKind::from_message(&msg),
            };
            return Self::new(kind, msg).with_code(failure.extended_code);
        }

        match err {
            rusqlite::Error::InvalidParameterName(_)
            | rusqlite::Error::InvalidParameterCount(..)
            | rusqlite::Error::MultipleStatement
            | rusqlite::Error::ExecuteReturnedResults
            | rusqlite::Error::InvalidQuery => Self::programming(msg),
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::Utf8Error(_) => Self::data(msg),
            _ => Self::new(DriverErrorKind::from_message(&msg), msg),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Self::Boolean(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*b))),
            Self::Integer(v) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*v)),
            Self::Real(v) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*v)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

fn open_flags(options: &ConnectOptions) -> DriverResult<OpenFlags> {
    let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let mode = match options.option("mode").unwrap_or("rwc") {
        "ro" => OpenFlags::SQLITE_OPEN_READ_ONLY,
        "rw" => OpenFlags::SQLITE_OPEN_READ_WRITE,
        "rwc" => OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        other => {
            return Err(DriverError::interface(format!(
                "unsupported sqlite mode: {other}"
            )));
        }
    };
    Ok(base | mode)
}

/// Database file named by the `path` option, else the decoded DSN path.
fn database_path(options: &ConnectOptions) -> DriverResult<String> {
    if let Some(path) = options.option(PATH_OPTION) {
        return Ok(path.to_string());
    }
    urlencoding::decode(options.dsn().path())
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| DriverError::interface(format!("invalid sqlite path: {e}")))
}

/// Rows changed by every statement run on `conn` so far.
fn total_changes(conn: &rusqlite::Connection) -> DriverResult<u64> {
    let total: i64 = conn.query_row("SELECT total_changes()", [], |row| row.get(0))?;
    Ok(total.unsigned_abs())
}

/// Connection to one SQLite database.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Rc<rusqlite::Connection>,
}

impl SqliteConnection {
    pub fn open_in_memory() -> DriverResult<Self> {
        Ok(Self {
            conn: Rc::new(rusqlite::Connection::open_in_memory()?),
        })
    }

    /// Underlying rusqlite connection.
    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl DriverConnection for SqliteConnection {
    type Statement = SqliteStatement;

    const NAME: &'static str = "sqlite";

    fn connect(options: &ConnectOptions) -> DriverResult<Self> {
        if options.scheme() != "sqlite" {
            return Err(DriverError::interface(format!(
                "sqlite adapter cannot open '{}' DSNs",
                options.scheme()
            )));
        }

        let path = database_path(options)?;
        let conn = if path.is_empty() || path == MEMORY_PATH {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open_with_flags(&path, open_flags(options)?)?
        };

        if let Some(ms) = options.option("busy_timeout") {
            let ms: u64 = ms
                .parse()
                .map_err(|_| DriverError::interface(format!("invalid busy_timeout: {ms}")))?;
            conn.busy_timeout(Duration::from_millis(ms))?;
        }

        Ok(Self {
            conn: Rc::new(conn),
        })
    }

    fn prepare(&mut self, sql: &str) -> DriverResult<SqliteStatement> {
        let stmt = self.conn.prepare_cached(sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        drop(stmt);

        Ok(SqliteStatement {
            conn: Rc::clone(&self.conn),
            sql: sql.to_string(),
            columns,
            rows: VecDeque::new(),
            row_count: 0,
        })
    }

    fn begin_transaction(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn roll_back(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn raw_exec(&mut self, sql: &str) -> DriverResult<u64> {
        let before = total_changes(&self.conn)?;
        self.conn.execute_batch(sql)?;
        Ok(total_changes(&self.conn)?.saturating_sub(before))
    }

    fn last_insert_id(&mut self) -> DriverResult<String> {
        Ok(self.conn.last_insert_rowid().to_string())
    }
}

/// Statement prepared on a [`SqliteConnection`].
///
/// The compiled statement lives in rusqlite's per-connection cache and is
/// checked out for each execution.
#[derive(Debug)]
pub struct SqliteStatement {
    conn: Rc<rusqlite::Connection>,
    sql: String,
    columns: Arc<[String]>,
    rows: VecDeque<Vec<Value>>,
    row_count: u64,
}

impl SqliteStatement {
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }
}

impl DriverStatement for SqliteStatement {
    fn query_string(&self) -> &str {
        &self.sql
    }

    fn bind_and_execute(&mut self, params: &Params) -> DriverResult<()> {
        self.rows.clear();
        self.row_count = 0;

        let mut stmt = self.conn.prepare_cached(&self.sql)?;

        for (name, value) in params.iter() {
            let idx = stmt
                .parameter_index(&format!(":{name}"))?
                .ok_or_else(|| DriverError::programming(format!("unknown parameter :{name}")))?;
            stmt.raw_bind_parameter(idx, value)?;
        }

        for idx in 1..=stmt.parameter_count() {
            match stmt.parameter_name(idx) {
                Some(name) if params.contains(name) => {}
                Some(name) => {
                    return Err(DriverError::programming(format!(
                        "no value bound for parameter {name}"
                    )));
                }
                None => {
                    return Err(DriverError::programming(format!(
                        "positional parameter {idx} is not supported, use :name"
                    )));
                }
            }
        }

        if self.columns.is_empty() {
            let changed = stmt.raw_execute()?;
            self.row_count = u64::try_from(changed).unwrap_or(u64::MAX);
            return Ok(());
        }

        // RETURNING statements produce rows and change rows
        let before = total_changes(&self.conn)?;
        let width = self.columns.len();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(value_from_ref(row.get_ref(i)?));
            }
            self.rows.push_back(values);
        }
        drop(rows);
        self.row_count = total_changes(&self.conn)?.saturating_sub(before);
        Ok(())
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn fetch_one(&mut self, mode: FetchMode) -> DriverResult<Option<Row>> {
        Ok(self
            .rows
            .pop_front()
            .map(|values| Row::from_values(&self.columns, values, mode)))
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn close_cursor(&mut self) {
        self.rows.clear();
    }
}

impl Database<SqliteConnection> {
    /// Wrap a fresh in-memory SQLite database.
    pub fn open_in_memory() -> Result<Self> {
        Self::connect(&ConnectOptions::parse("sqlite::memory:")?)
    }

    /// Open or create a SQLite database file.
    ///
    /// The path is passed as the `path` option, so characters such as `#`,
    /// `?` or spaces are never read as URL syntax.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let Some(path) = path.to_str() else {
            return Err(Error::invalid_argument(format!(
                "sqlite path is not valid UTF-8: {}",
                path.display()
            )));
        };
        let options = ConnectOptions::builder()
            .dsn_str("sqlite:")?
            .option(PATH_OPTION, path)
            .build()?;
        Self::connect(&options)
    }
}
