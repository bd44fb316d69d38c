//! SQL generation for the DML verbs and the per-shape SQL cache.

mod builder;
mod cache;
mod placeholders;

pub use builder::{KeyColumns, delete_sql, insert_sql, update_sql};
pub use cache::{DmlOperation, ShapeToken, SqlCache, SqlCacheKey};
pub use placeholders::named_to_positional;
