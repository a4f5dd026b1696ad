//! Shared types for the marketplace
//!
//! Wire-contract types consumed by both the server and the storefront
//! clients: order/product status enums (the serialized string forms are a
//! compatibility contract with existing frontend pages), the order status
//! transition table, timeline entries, addresses and stock variants.

pub mod order;
pub mod types;
pub mod util;

// Re-exports
pub use order::{OrderStatus, PaymentMethod, TimelineEntry};
pub use serde::{Deserialize, Serialize};
pub use types::{Address, ProductStatus, UserRole, VariantKey, VariantStock};
