//! Generated-SQL cache keyed by row shape.
//!
//! Entries are created on first use of a shape and kept for the lifetime of
//! the cache. There is no eviction: the number of distinct shapes per table is
//! small and the schema is assumed stable.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use md5::{Digest, Md5};

/// Separator fed to the digest between column names; never part of an identifier.
const COLUMN_SEPARATOR: &[u8] = b"\0";

/// Marks the start of key columns in an update shape.
const KEY_MARKER: &[u8] = b"\0\x01";

/// DML operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DmlOperation {
    Insert,
    Update,
    Delete,
}

impl DmlOperation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for DmlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content hash of an ordered list of column names.
///
/// Depends on names and order only, never on values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeToken(String);

impl ShapeToken {
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = Md5::new();
        feed_columns(&mut hasher, columns);
        Self(hex::encode(hasher.finalize()))
    }

    /// Token of an update shape: data columns followed by the key columns.
    pub fn with_keys<'a, 'b>(
        columns: impl IntoIterator<Item = &'a str>,
        keys: impl IntoIterator<Item = &'b str>,
    ) -> Self {
        let mut hasher = Md5::new();
        feed_columns(&mut hasher, columns);
        hasher.update(KEY_MARKER);
        feed_columns(&mut hasher, keys);
        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn feed_columns<'a>(hasher: &mut Md5, columns: impl IntoIterator<Item = &'a str>) {
    for (i, col) in columns.into_iter().enumerate() {
        if i > 0 {
            hasher.update(COLUMN_SEPARATOR);
        }
        hasher.update(col.as_bytes());
    }
}

impl fmt::Display for ShapeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlCacheKey {
    operation: DmlOperation,
    table: String,
    token: ShapeToken,
}

impl SqlCacheKey {
    pub fn new(operation: DmlOperation, table: impl Into<String>, token: ShapeToken) -> Self {
        Self {
            operation,
            table: table.into(),
            token,
        }
    }

    #[must_use]
    pub const fn operation(&self) -> DmlOperation {
        self.operation
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn token(&self) -> &ShapeToken {
        &self.token
    }
}

impl fmt::Display for SqlCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.operation, self.table, self.token)
    }
}

#[derive(Debug, Default)]
pub struct SqlCache {
    entries: HashMap<SqlCacheKey, Arc<str>>,
    hits: u64,
    misses: u64,
}

impl SqlCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn hits(&self) -> u64 {
        self.hits
    }

    pub const fn misses(&self) -> u64 {
        self.misses
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn contains(&self, key: &SqlCacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up without touching the hit/miss counters.
    pub fn peek(&self, key: &SqlCacheKey) -> Option<&Arc<str>> {
        self.entries.get(key)
    }

    /// Cached SQL for `key`, generating it with `build` on the first request.
    pub fn get_or_insert_with<F>(&mut self, key: SqlCacheKey, build: F) -> Arc<str>
    where
        F: FnOnce() -> String,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                tracing::debug!(sql.cache = "hit", sql.key = %entry.key());
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let sql: Arc<str> = build().into();
                tracing::debug!(sql.cache = "miss", sql.key = %entry.key(), sql = %sql);
                Arc::clone(entry.insert(sql))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(op: DmlOperation, table: &str, cols: &[&str]) -> SqlCacheKey {
        SqlCacheKey::new(op, table, ShapeToken::from_columns(cols.iter().copied()))
    }

    #[test]
    fn test_shape_token_is_md5_hex() {
        let token = ShapeToken::from_columns(["name"]);
        // md5("name")
        assert_eq!(token.as_str(), "b068931cc450442b63f5b3d276ea4297");
    }

    #[test]
    fn test_shape_token_order_sensitive() {
        let a = ShapeToken::from_columns(["name", "email"]);
        let b = ShapeToken::from_columns(["email", "name"]);
        assert_ne!(a, b);
        assert_eq!(a, ShapeToken::from_columns(["name", "email"]));
    }

    #[test]
    fn test_shape_token_separates_columns() {
        let a = ShapeToken::from_columns(["ab", "c"]);
        let b = ShapeToken::from_columns(["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shape_token_with_keys_differs_by_key() {
        let cols = ["id", "name"];
        let by_id = ShapeToken::with_keys(cols, ["id"]);
        let by_name = ShapeToken::with_keys(cols, ["name"]);
        assert_ne!(by_id, by_name);
        assert_ne!(by_id, ShapeToken::from_columns(cols));
    }

    #[test]
    fn test_cache_key_display() {
        let k = key(DmlOperation::Insert, "users", &["name"]);
        assert_eq!(k.to_string(), "insert:users:b068931cc450442b63f5b3d276ea4297");
        assert_eq!(k.operation(), DmlOperation::Insert);
        assert_eq!(k.table(), "users");
    }

    #[test]
    fn test_get_or_insert_builds_once() {
        let mut cache = SqlCache::new();
        let mut builds = 0;

        let first = cache.get_or_insert_with(key(DmlOperation::Insert, "t", &["a"]), || {
            builds += 1;
            "INSERT into t (a) values (:a)".to_string()
        });
        let second = cache.get_or_insert_with(key(DmlOperation::Insert, "t", &["a"]), || {
            builds += 1;
            String::from("unused")
        });

        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_operations_and_tables_are_isolated() {
        let mut cache = SqlCache::new();
        cache.get_or_insert_with(key(DmlOperation::Insert, "t", &["id"]), || "i".into());
        cache.get_or_insert_with(key(DmlOperation::Delete, "t", &["id"]), || "d".into());
        cache.get_or_insert_with(key(DmlOperation::Delete, "u", &["id"]), || "u".into());

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.misses(), 3);
        assert_eq!(
            cache
                .peek(&key(DmlOperation::Delete, "t", &["id"]))
                .map(AsRef::as_ref),
            Some("d")
        );
        assert!(!cache.contains(&key(DmlOperation::Update, "t", &["id"])));
    }

    #[test]
    fn test_empty_cache() {
        let cache = SqlCache::new();
        assert!(cache.is_empty());
        assert!(cache.hit_rate().abs() < f64::EPSILON);
    }
}
