//! Refund model
//!
//! A refund is a manual audit record linked 1:1 to a cancelled order.
//! It does not reverse any payment.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// The cancelled order this refund settles
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    /// Amount returned to the buyer, at most the order total
    pub amount: f64,
    /// Free-form method label ("bank transfer", "wallet credit", ...)
    pub method: String,
    pub reason: String,
    #[serde(default)]
    pub screenshot: Option<String>,
    /// Admin who processed the refund
    #[serde(with = "serde_helpers::record_id")]
    pub processed_by: RecordId,
    pub created_at: i64,
}

/// Admin create payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundCreate {
    /// Order id, `"order:key"` or bare key
    pub order_id: String,
    pub amount: f64,
    pub method: String,
    pub reason: String,
    #[serde(default)]
    pub screenshot: Option<String>,
}
