//! Command execution

use serde_json::json;
use sqlverb::{ConnectOptions, Database, DiagnosticsConfig, DriverConnection};

use crate::cli::Command;
use crate::config::Config;
use crate::{Error, Result};

/// Connect with the driver the DSN scheme selects and run `command`.
pub fn run(config: &Config, command: &Command) -> Result<serde_json::Value> {
    let options = config.connect_options()?;
    tracing::debug!(dsn = %options.redacted_dsn(), "dispatching command");

    match options.scheme() {
        #[cfg(feature = "sqlite")]
        "sqlite" => run_with::<sqlverb::SqliteConnection>(&options, config.diagnostics, command),
        #[cfg(feature = "hana")]
        "hdbsql" | "hdbsqls" => {
            run_with::<sqlverb::HanaConnection>(&options, config.diagnostics, command)
        }
        other => Err(Error::UnsupportedScheme(other.to_string())),
    }
}

pub fn run_with<C: DriverConnection>(
    options: &ConnectOptions,
    diagnostics: DiagnosticsConfig,
    command: &Command,
) -> Result<serde_json::Value> {
    let mut db = Database::<C>::connect_with(options, diagnostics)?;
    execute(&mut db, command)
}

/// Run one command on an open database and shape its JSON output.
pub fn execute<C: DriverConnection>(
    db: &mut Database<C>,
    command: &Command,
) -> Result<serde_json::Value> {
    let output = match command {
        Command::Query { sql, params, mode } => {
            serde_json::to_value(db.query_all(sql, &params.to_params(), *mode)?)?
        }
        Command::One { sql, params } => {
            serde_json::to_value(db.query_one(sql, &params.to_params())?)?
        }
        Command::Exec { sql, params } => {
            json!({ "affected_rows": db.exec(sql, &params.to_params())? })
        }
        Command::Insert { table, data } => {
            let affected = db.insert(table, &data.to_params())?;
            json!({ "affected_rows": affected, "last_insert_id": db.last_insert_id()? })
        }
        Command::Update { table, data, keys } => {
            let data = data.to_params();
            let affected = if keys.is_empty() {
                db.update_by_id(table, &data)?
            } else {
                db.update(table, &data, keys.clone())?
            };
            json!({ "affected_rows": affected })
        }
        Command::Delete { table, data } => {
            json!({ "affected_rows": db.delete(table, &data.to_params())? })
        }
    };
    Ok(output)
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use clap::Parser;
    use sqlverb::SqliteConnection;

    use super::*;
    use crate::cli::Cli;
    use crate::config::ConfigBuilder;

    fn seeded() -> Database<SqliteConnection> {
        let mut db = Database::<SqliteConnection>::open_in_memory().unwrap();
        db.t_exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .unwrap();
        db.t_exec("INSERT INTO users (name, age) VALUES ('Ann', 30), ('Bob', 25)")
            .unwrap();
        db
    }

    fn command(args: &[&str]) -> Command {
        let argv = std::iter::once("sqlverb").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command
    }

    fn execute_args(db: &mut Database<SqliteConnection>, args: &[&str]) -> serde_json::Value {
        execute(db, &command(args)).unwrap()
    }

    #[test]
    fn test_query_outputs_rows() {
        let mut db = seeded();
        let sql = "SELECT id, name FROM users WHERE age > :age ORDER BY id";
        let out = execute_args(&mut db, &["query", sql, "-p", "age=20"]);
        assert_eq!(out, json!([{ "id": 1, "name": "Ann" }, { "id": 2, "name": "Bob" }]));
    }

    #[test]
    fn test_query_num_mode() {
        let mut db = seeded();
        let sql = "SELECT id, name FROM users WHERE id = 2";
        let out = execute_args(&mut db, &["query", sql, "--mode", "num"]);
        assert_eq!(out, json!([[2, "Bob"]]));
    }

    #[test]
    fn test_one_outputs_scalar_or_null() {
        let mut db = seeded();
        let sql = "SELECT name FROM users WHERE id = :id";
        assert_eq!(execute_args(&mut db, &["one", sql, "-p", "id=1"]), json!("Ann"));
        assert_eq!(
            execute_args(&mut db, &["one", sql, "-p", "id=99"]),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_row_verbs() {
        let mut db = seeded();

        let out = execute_args(&mut db, &["insert", "users", "-s", "name=Cid", "-s", "age=41"]);
        assert_eq!(out, json!({ "affected_rows": 1, "last_insert_id": "3" }));

        let out = execute_args(&mut db, &["update", "users", "-s", "id=3", "-s", "age=42"]);
        assert_eq!(out, json!({ "affected_rows": 1 }));

        let args = ["update", "users", "-s", "name=Cid", "-s", "age=43", "--key", "name"];
        assert_eq!(execute_args(&mut db, &args), json!({ "affected_rows": 1 }));
        assert_eq!(
            db.query_one("SELECT age FROM users WHERE id = 3", &sqlverb::Params::new())
                .unwrap()
                .and_then(|v| v.as_i64()),
            Some(43)
        );

        let out = execute_args(&mut db, &["delete", "users", "--set", "name=Bob"]);
        assert_eq!(out, json!({ "affected_rows": 1 }));
    }

    #[test]
    fn test_exec_reports_affected_rows() {
        let mut db = seeded();
        let out = execute_args(&mut db, &["exec", "UPDATE users SET age = age + 1"]);
        assert_eq!(out, json!({ "affected_rows": 2 }));
    }

    #[test]
    fn test_database_errors_propagate() {
        let mut db = seeded();
        let err = execute(&mut db, &command(&["query", "SELECT * FROM missing"])).unwrap_err();
        assert!(err.is_database());
        assert!(db.has_error());
    }

    #[test]
    fn test_run_dispatches_sqlite() {
        let config = ConfigBuilder::new()
            .dsn_str("sqlite::memory:")
            .unwrap()
            .capture_backtrace(false)
            .build()
            .unwrap();
        let out = run(&config, &command(&["one", "SELECT 1 + 1"])).unwrap();
        assert_eq!(out, json!(2));
    }

    #[test]
    fn test_run_rejects_unknown_scheme() {
        let config = ConfigBuilder::new()
            .dsn_str("mysql://localhost/app")
            .unwrap()
            .build()
            .unwrap();
        let err = run(&config, &command(&["one", "SELECT 1"])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(s) if s == "mysql"));
    }
}
