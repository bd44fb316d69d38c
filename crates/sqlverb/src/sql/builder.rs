//! SQL text for the row-level DML verbs.
//!
//! Table and column names are interpolated as given; quoting or validating
//! identifiers is the caller's responsibility. Values are always bound through
//! `:column` placeholders.

/// Key columns identifying the rows an update touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyColumns {
    Single(String),
    Multi(Vec<String>),
}

impl KeyColumns {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::Multi(names) => names,
        };
        names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.iter().any(|k| k == column)
    }

    /// True when no usable key column is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(name) => name.is_empty(),
            Self::Multi(names) => names.is_empty() || names.iter().any(String::is_empty),
        }
    }
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self::Single("id".to_string())
    }
}

impl From<&str> for KeyColumns {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for KeyColumns {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for KeyColumns {
    fn from(names: Vec<String>) -> Self {
        Self::Multi(names)
    }
}

impl From<&[&str]> for KeyColumns {
    fn from(names: &[&str]) -> Self {
        Self::Multi(names.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyColumns {
    fn from(names: [&str; N]) -> Self {
        Self::Multi(names.iter().map(ToString::to_string).collect())
    }
}

fn assignments<'a>(columns: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    columns
        .into_iter()
        .map(|col| format!("{col} = :{col}"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// `INSERT into <table> (c1, c2) values (:c1, :c2)`
#[must_use]
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let names = columns.join(", ");
    let placeholders = columns
        .iter()
        .map(|col| format!(":{col}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT into {table} ({names}) values ({placeholders})")
}

/// `DELETE from <table> WHERE c1 = :c1 and c2 = :c2`
///
/// Every column is a filter; the caller supplies exactly the intended ones.
#[must_use]
pub fn delete_sql(table: &str, columns: &[&str]) -> String {
    let filter = assignments(columns.iter().copied(), " and ");
    format!("DELETE from {table} WHERE {filter}")
}

/// `UPDATE <table> SET c = :c, … WHERE k = :k and …`
///
/// Key columns are left out of the SET clause; the SET clause keeps data
/// order and the WHERE clause keeps key order.
#[must_use]
pub fn update_sql(table: &str, columns: &[&str], keys: &KeyColumns) -> String {
    let set = assignments(
        columns.iter().copied().filter(|col| !keys.contains(col)),
        ", ",
    );
    let filter = assignments(keys.iter(), " and ");
    format!("UPDATE {table} SET {set} WHERE {filter}")
}
