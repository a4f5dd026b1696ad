//! Order model
//!
//! Persisted order documents are the wire contract for the storefront
//! order-detail pages: camelCase field names (`totalAmount`,
//! `shippingInfo`, `paymentScreenshot`), lowercase status strings and the
//! append-only `timeline` array must be reproduced exactly.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{Address, OrderStatus, PaymentMethod, TimelineEntry, VariantKey};
use surrealdb::RecordId;

/// A purchased line item. `price` and `name` are copied from the product
/// at checkout time so later catalog edits don't rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    #[serde(default)]
    pub variant: Option<VariantKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub buyer: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub seller: RecordId,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_screenshot: Option<String>,
    #[serde(default)]
    pub payment_confirmed: bool,
    pub shipping_info: Address,
    pub billing_info: Address,
    pub status: OrderStatus,
    pub timeline: Vec<TimelineEntry>,
    pub created_at: i64,
}

impl Order {
    /// The record id as a wire string, once persisted.
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn is_buyer(&self, user_id: &str) -> bool {
        self.buyer.to_string() == user_id
    }

    pub fn is_seller(&self, user_id: &str) -> bool {
        self.seller.to_string() == user_id
    }
}

// ========== API request types ==========

/// One line of the checkout payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    /// Product id, `"product:key"` or bare key
    pub product: String,
    pub quantity: i32,
    /// Client-observed unit price; must match the catalog within 1 cent
    pub price: f64,
    #[serde(default)]
    pub variant: Option<VariantKey>,
}

/// Checkout payload (the `payload` part of the multipart request).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub seller: String,
    pub items: Vec<OrderItemInput>,
    /// Client-computed sums; verified against the server-side recompute
    pub subtotal: f64,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub shipping_info: Address,
    pub billing_info: Address,
}

/// Seller status update (`placed` / `confirmed`).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Buyer cancellation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub note: Option<String>,
}
