//! Refund repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Refund;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const REFUND_TABLE: &str = "refund";

#[derive(Clone)]
pub struct RefundRepository {
    base: BaseRepository,
}

impl RefundRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a refund record. The unique index on `orderId` rejects a
    /// second refund for the same order even if the caller's existence
    /// check raced.
    pub async fn create(&self, refund: Refund) -> RepoResult<Refund> {
        let order_id = refund.order_id.to_string();
        let created: Result<Option<Refund>, surrealdb::Error> =
            self.base.db().create(REFUND_TABLE).content(refund).await;
        match created {
            Ok(Some(refund)) => Ok(refund),
            Ok(None) => Err(RepoError::Database("Failed to create refund".to_string())),
            Err(e) if e.to_string().contains("already contains") => Err(RepoError::Duplicate(
                format!("Refund already exists for order {order_id}"),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_order(&self, order_id: &RecordId) -> RepoResult<Option<Refund>> {
        let refunds: Vec<Refund> = self
            .base
            .db()
            .query("SELECT * FROM refund WHERE orderId = $order")
            .bind(("order", order_id.to_string()))
            .await?
            .take(0)?;
        Ok(refunds.into_iter().next())
    }
}
