//! Revenue ledger model
//!
//! Platform revenue is an append-only ledger of signed entries keyed by
//! order id; the current figure is the fold over `amount`. Nothing ever
//! rewrites an entry, which keeps the history replayable and auditable.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Why an entry was appended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevenueReason {
    /// Order entered `confirmed`: +total
    OrderConfirmed,
    /// Confirmed order was cancelled: -total
    OrderCancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueEntry {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    /// Signed amount: positive on confirmation, negative on cancellation
    pub amount: f64,
    pub reason: RevenueReason,
    pub entered_at: i64,
}

/// Admin revenue view: the fold plus recent entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total: f64,
    pub entries: Vec<RevenueEntry>,
}
