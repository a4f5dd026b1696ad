//! Order repository
//!
//! Orders are looked up by buyer/seller at query time through the indexed
//! `buyer` / `seller` fields. Status changes go through [`append_status`],
//! which writes the new status and the timeline entry in one statement so
//! the timeline can never miss a transition.

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::Order;
use shared::{OrderStatus, TimelineEntry};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = record_id(ORDER_TABLE, id)?;
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    pub async fn find_by_buyer(
        &self,
        buyer: &str,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        self.find_by_party("buyer", buyer, limit, offset).await
    }

    pub async fn find_by_seller(
        &self,
        seller: &str,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        self.find_by_party("seller", seller, limit, offset).await
    }

    async fn find_by_party(
        &self,
        field: &str,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        let limit = limit.clamp(1, 200);
        let offset = offset.max(0);
        let orders: Vec<Order> = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM order WHERE {field} = $user \
                 ORDER BY createdAt DESC LIMIT {limit} START {offset}"
            ))
            .bind(("user", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Write the new status and append the timeline entry atomically.
    pub async fn append_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
        entry: TimelineEntry,
    ) -> RepoResult<Order> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, timeline += $entry RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", status))
            .bind(("entry", entry))
            .await?
            .take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Admin payment approval flag.
    pub async fn set_payment_confirmed(&self, id: &str, confirmed: bool) -> RepoResult<Order> {
        let rid = record_id(ORDER_TABLE, id)?;
        let orders: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET paymentConfirmed = $confirmed RETURN AFTER")
            .bind(("id", rid))
            .bind(("confirmed", confirmed))
            .await?
            .take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Sum of `totalAmount` over orders currently confirmed. The revenue
    /// ledger fold must agree with this figure.
    pub async fn sum_confirmed_totals(&self) -> RepoResult<f64> {
        let total: Option<f64> = self
            .base
            .db()
            .query(
                "RETURN <float> math::sum((SELECT VALUE totalAmount FROM order \
                 WHERE status = 'confirmed'))",
            )
            .await?
            .take(0)?;
        Ok(total.unwrap_or(0.0))
    }
}
