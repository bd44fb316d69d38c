//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sqlverb::{FetchMode, Params, Value};

#[derive(Parser, Debug)]
#[command(name = "sqlverb")]
#[command(about = "Run SQL verbs against SQLite or SAP HANA", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Connection DSN (sqlite:path, sqlite::memory:, hdbsql://host:port)
    #[arg(short, long)]
    pub dsn: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable JSON logging output
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a query and print every row
    Query {
        sql: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Row shape: assoc, num or both
        #[arg(short, long, default_value = "assoc", value_parser = parse_mode)]
        mode: FetchMode,
    },

    /// Run a query and print the first column of the first row
    One {
        sql: String,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Execute a statement and print the affected row count
    Exec {
        sql: String,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Insert one row built from the --set values
    Insert {
        table: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Update rows matched by the key columns (default: id)
    Update {
        table: String,

        #[command(flatten)]
        data: DataArgs,

        /// Key column, repeatable for composite keys
        #[arg(short, long = "key")]
        keys: Vec<String>,
    },

    /// Delete rows matching every --set value
    Delete {
        table: String,

        #[command(flatten)]
        data: DataArgs,
    },
}

/// Bind parameters for a statement.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ParamArgs {
    /// Bind parameter, repeatable
    #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub params: Vec<(String, Value)>,
}

impl ParamArgs {
    pub fn to_params(&self) -> Params {
        self.params.iter().cloned().collect()
    }
}

/// Column values for a row-level verb.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct DataArgs {
    /// Column value, repeatable
    #[arg(
        short = 's',
        long = "set",
        value_name = "COLUMN=VALUE",
        required = true,
        value_parser = parse_assignment
    )]
    pub values: Vec<(String, Value)>,
}

impl DataArgs {
    pub fn to_params(&self) -> Params {
        self.values.iter().cloned().collect()
    }
}

/// Split `name=value`; the value is typed by [`parse_value`].
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.trim_start_matches(':').is_empty() {
        return Err(format!("missing name in '{s}'"));
    }
    Ok((name.to_string(), parse_value(value)))
}

/// Integer, finite real, `true`/`false` or `null`; anything else is text.
pub fn parse_value(s: &str) -> Value {
    match s {
        "null" | "NULL" => return Value::Null,
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>()
        && f.is_finite()
    {
        return Value::Real(f);
    }
    Value::Text(s.to_string())
}

fn parse_mode(s: &str) -> Result<FetchMode, String> {
    s.parse().map_err(|e: sqlverb::Error| e.to_string())
}
