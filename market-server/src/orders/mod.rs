//! Order domain
//!
//! - [`money`] - decimal arithmetic and tolerance checks
//! - [`stock`] - variant stock reconciliation (the only stock write path)
//! - [`checkout`] - order placement saga
//! - [`lifecycle`] - status transitions and their side effects
//! - [`screenshot`] - payment screenshot persistence

pub mod checkout;
pub mod lifecycle;
pub mod money;
pub mod screenshot;
pub mod stock;

pub use checkout::CheckoutService;
pub use lifecycle::LifecycleService;
pub use stock::StockLedger;

use crate::db::repository::RepoError;
use thiserror::Error;

/// Errors produced by the order domain services.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for OrderError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => OrderError::NotFound(msg),
            RepoError::Duplicate(msg) => OrderError::Conflict(msg),
            RepoError::Validation(msg) => OrderError::Validation(msg),
            RepoError::Database(msg) => OrderError::Database(msg),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
