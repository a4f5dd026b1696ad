//! Repository module
//!
//! CRUD and domain queries over the embedded SurrealDB tables.
//!
//! Id convention: the whole stack uses the `"table:key"` string form.
//! Repositories accept either `"table:key"` or a bare key and normalize
//! through [`record_id`].

pub mod order;
pub mod product;
pub mod refund;
pub mod revenue;
pub mod user;

pub use order::OrderRepository;
pub use product::ProductRepository;
pub use refund::RefundRepository;
pub use revenue::RevenueRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types. The API layer maps these onto HTTP statuses
/// (`NotFound` → 404, `Duplicate` → 409, `Validation` → 400, `Database`
/// → 500) through `AppError`.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Normalize an id into a [`RecordId`] for `table`.
///
/// Accepts `"table:key"` (rejecting a mismatched table) or a bare key.
pub fn record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    match id.split_once(':') {
        Some((prefix, key)) if prefix == table => Ok(RecordId::from_table_key(table, key)),
        Some((prefix, _)) => Err(RepoError::Validation(format!(
            "Expected a {table} id, got {prefix}:*"
        ))),
        None => Ok(RecordId::from_table_key(table, id)),
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_accepts_both_forms() {
        assert_eq!(
            record_id("product", "abc").unwrap().to_string(),
            "product:abc"
        );
        assert_eq!(
            record_id("product", "product:abc").unwrap().to_string(),
            "product:abc"
        );
    }

    #[test]
    fn record_id_rejects_wrong_table() {
        assert!(record_id("product", "order:abc").is_err());
    }
}
