//! Fetched rows and fetch modes.

use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::Error;
use crate::value::Value;

/// Shape of rows produced by a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchMode {
    /// Column name → value.
    #[default]
    Assoc,
    /// Values by ordinal.
    Num,
    /// Driver-default shape, addressable by name and by ordinal.
    Both,
}

impl FetchMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assoc => "assoc",
            Self::Num => "num",
            Self::Both => "both",
        }
    }
}

impl FromStr for FetchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assoc" => Ok(Self::Assoc),
            "num" => Ok(Self::Num),
            "both" | "default" => Ok(Self::Both),
            other => Err(Error::invalid_argument(format!(
                "unknown fetch mode: {other}"
            ))),
        }
    }
}

/// One fetched row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Assoc(IndexMap<String, Value>),
    Num(Vec<Value>),
    Both {
        columns: Arc<[String]>,
        values: Vec<Value>,
    },
}

impl Row {
    /// Shape raw driver values according to `mode`.
    ///
    /// In `Assoc` mode a repeated column name keeps its first position and the
    /// last value.
    #[must_use]
    pub fn from_values(columns: &Arc<[String]>, values: Vec<Value>, mode: FetchMode) -> Self {
        match mode {
            FetchMode::Assoc => Self::Assoc(columns.iter().cloned().zip(values).collect()),
            FetchMode::Num => Self::Num(values),
            FetchMode::Both => Self::Both {
                columns: Arc::clone(columns),
                values,
            },
        }
    }

    #[must_use]
    pub const fn mode(&self) -> FetchMode {
        match self {
            Self::Assoc(_) => FetchMode::Assoc,
            Self::Num(_) => FetchMode::Num,
            Self::Both { .. } => FetchMode::Both,
        }
    }

    /// Value of the named column. Always `None` for `Num` rows.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self {
            Self::Assoc(map) => map.get(column),
            Self::Num(_) => None,
            Self::Both { columns, values } => columns
                .iter()
                .rposition(|c| c == column)
                .and_then(|i| values.get(i)),
        }
    }

    /// Value at the given ordinal.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Assoc(map) => map.get_index(index).map(|(_, v)| v),
            Self::Num(values) | Self::Both { values, .. } => values.get(index),
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.get_index(0)
    }

    #[must_use]
    pub fn contains_column(&self, column: &str) -> bool {
        match self {
            Self::Assoc(map) => map.contains_key(column),
            Self::Num(_) => false,
            Self::Both { columns, .. } => columns.iter().any(|c| c == column),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Assoc(map) => map.len(),
            Self::Num(values) | Self::Both { values, .. } => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Assoc(map) => map.into_values().collect(),
            Self::Num(values) | Self::Both { values, .. } => values,
        }
    }
}
