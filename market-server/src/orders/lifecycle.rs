//! Order lifecycle
//!
//! Enforces the unified transition table from `shared::OrderStatus` and
//! runs the side effects each transition carries:
//!
//! - entering `confirmed` appends `+total` to the revenue ledger;
//! - leaving `confirmed` through `cancelled` appends `-total` and
//!   restores stock;
//! - cancelling from `pending` restores stock only.
//!
//! Side effects run after the status write. A failure there is logged and
//! does not fail the request; the integrity job reports any drift.

use crate::db::models::{Order, Refund, RefundCreate, RevenueReason};
use crate::db::repository::{
    OrderRepository, RefundRepository, RevenueRepository, record_id,
};
use crate::orders::money;
use crate::orders::stock::StockLedger;
use crate::orders::{OrderError, OrderResult};
use shared::{OrderStatus, TimelineEntry};
use surrealdb::RecordId;

#[derive(Clone)]
pub struct LifecycleService {
    orders: OrderRepository,
    revenue: RevenueRepository,
    refunds: RefundRepository,
    stock: StockLedger,
}

impl LifecycleService {
    pub fn new(
        orders: OrderRepository,
        revenue: RevenueRepository,
        refunds: RefundRepository,
        stock: StockLedger,
    ) -> Self {
        Self {
            orders,
            revenue,
            refunds,
            stock,
        }
    }

    pub async fn get(&self, order_id: &str) -> OrderResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Drive `order_id` to `next`, appending a timeline entry for `actor`.
    pub async fn transition(
        &self,
        order_id: &str,
        next: OrderStatus,
        actor: &str,
        note: Option<String>,
    ) -> OrderResult<Order> {
        let order = self.get(order_id).await?;
        let current = order.status;
        if !current.can_transition(next) {
            return Err(OrderError::Validation(format!(
                "Invalid status transition: {current} -> {next}"
            )));
        }

        let id = order
            .id
            .clone()
            .ok_or_else(|| OrderError::Database("Order has no id".to_string()))?;
        let entry = TimelineEntry::new(next, Some(actor.to_string()), note);
        let updated = self.orders.append_status(&id, next, entry).await?;

        self.run_side_effects(&id, &order, current, next).await;
        Ok(updated)
    }

    async fn run_side_effects(
        &self,
        id: &RecordId,
        order: &Order,
        from: OrderStatus,
        to: OrderStatus,
    ) {
        if to == OrderStatus::Confirmed && from != OrderStatus::Confirmed {
            if let Err(e) = self
                .revenue
                .append(id.clone(), order.total_amount, RevenueReason::OrderConfirmed)
                .await
            {
                tracing::error!(order = %id, error = %e, "Failed to append revenue entry");
            }
        }

        if to == OrderStatus::Cancelled {
            if from == OrderStatus::Confirmed {
                if let Err(e) = self
                    .revenue
                    .append(
                        id.clone(),
                        -order.total_amount,
                        RevenueReason::OrderCancelled,
                    )
                    .await
                {
                    tracing::error!(order = %id, error = %e, "Failed to reverse revenue entry");
                }
            }
            // Both pending and confirmed cancellations return the goods.
            self.stock.restore(&order.items).await;
        }
    }

    /// Record a refund for a cancelled order and move it to `refunded`.
    pub async fn create_refund(&self, admin_id: &str, input: RefundCreate) -> OrderResult<Refund> {
        let order = self.get(&input.order_id).await?;
        let id = order
            .id
            .clone()
            .ok_or_else(|| OrderError::Database("Order has no id".to_string()))?;

        // Duplicate check first: a refunded order has already left
        // `cancelled`, and "already refunded" is the real answer there.
        if self.refunds.find_by_order(&id).await?.is_some() {
            return Err(OrderError::Conflict(format!(
                "Refund already exists for order {}",
                id
            )));
        }
        if order.status != OrderStatus::Cancelled {
            return Err(OrderError::Validation(
                "Refund requires a cancelled order".to_string(),
            ));
        }

        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(OrderError::Validation(
                "Refund amount must be positive".to_string(),
            ));
        }
        if input.amount > order.total_amount && !money::money_eq(input.amount, order.total_amount) {
            return Err(OrderError::Validation(
                "Refund amount exceeds order total".to_string(),
            ));
        }

        let processed_by = record_id("user", admin_id)
            .map_err(|_| OrderError::Validation("Invalid admin id".to_string()))?;
        let refund = self
            .refunds
            .create(Refund {
                id: None,
                order_id: id.clone(),
                amount: input.amount,
                method: input.method,
                reason: input.reason,
                screenshot: input.screenshot,
                processed_by: processed_by.clone(),
                created_at: shared::util::now_millis(),
            })
            .await?;

        // The refund record is the primary write; the status flip is a
        // side effect and only logged on failure.
        let entry = TimelineEntry::new(
            OrderStatus::Refunded,
            Some(processed_by.to_string()),
            Some(format!("Refunded {:.2} via {}", refund.amount, refund.method)),
        );
        if let Err(e) = self
            .orders
            .append_status(&id, OrderStatus::Refunded, entry)
            .await
        {
            tracing::error!(order = %id, error = %e, "Failed to mark order refunded");
        }

        Ok(refund)
    }

    pub async fn find_refund(&self, order_id: &str) -> OrderResult<Option<Refund>> {
        let rid = record_id("order", order_id)
            .map_err(|_| OrderError::Validation("Invalid order id".to_string()))?;
        Ok(self.refunds.find_by_order(&rid).await?)
    }
}
