//! Database models
//!
//! Document shapes persisted in SurrealDB. Order/product/refund documents
//! double as the wire contract and serialize camelCase; the revenue ledger
//! and users are internal and stay snake_case.

pub mod order;
pub mod product;
pub mod refund;
pub mod revenue;
pub mod serde_helpers;
pub mod user;

pub use order::{CancelRequest, Order, OrderCreate, OrderItem, OrderItemInput, UpdateStatusRequest};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use refund::{Refund, RefundCreate};
pub use revenue::{RevenueEntry, RevenueReason, RevenueSummary};
pub use user::User;
