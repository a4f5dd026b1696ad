//! Order status lifecycle
//!
//! The status strings below are persisted verbatim in order documents and
//! rendered by the frontend order-detail pages, so their serialized forms
//! must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
///
/// Normal flow: pending → placed → confirmed → processing → shipped →
/// delivered. Cancellation is permitted from `pending` and `confirmed`;
/// a refund record moves a cancelled order to `refunded`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Placed,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

impl OrderStatus {
    /// Unified transition table for the whole lifecycle.
    ///
    /// Sellers may confirm directly from `pending` (skipping the `placed`
    /// acknowledgement), matching what the storefront allows.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Placed)
                | (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Placed, Confirmed)
                | (Confirmed, Processing)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Shipped, Returned)
                | (Cancelled, Refunded)
        )
    }

    /// Statuses reachable through the seller delivery endpoint.
    pub fn is_delivery_stage(self) -> bool {
        use OrderStatus::*;
        matches!(self, Processing | Shipped | Delivered | Returned)
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        use OrderStatus::*;
        matches!(self, Delivered | Returned | Refunded)
    }

    pub fn as_str(self) -> &'static str {
        use OrderStatus::*;
        match self {
            Pending => "pending",
            Placed => "placed",
            Confirmed => "confirmed",
            Processing => "processing",
            Shipped => "shipped",
            Delivered => "delivered",
            Cancelled => "cancelled",
            Returned => "returned",
            Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared payment method on checkout. The system never talks to a
/// payment processor; the buyer uploads a transfer screenshot and an admin
/// approves it by hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bank,
    Wallet,
}

/// Append-only audit entry on an order's `timeline` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: OrderStatus,
    /// UTC milliseconds
    pub date: i64,
    #[serde(default)]
    pub note: Option<String>,
    /// Id of the user who drove the transition
    #[serde(default)]
    pub actor: Option<String>,
}

impl TimelineEntry {
    pub fn new(status: OrderStatus, actor: Option<String>, note: Option<String>) -> Self {
        Self {
            status,
            date: crate::util::now_millis(),
            note,
            actor,
        }
    }
}
