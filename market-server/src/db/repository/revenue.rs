//! Revenue ledger repository
//!
//! Append-only: entries are inserted and folded, never updated.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{RevenueEntry, RevenueReason};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const REVENUE_TABLE: &str = "revenue_entry";

#[derive(Clone)]
pub struct RevenueRepository {
    base: BaseRepository,
}

impl RevenueRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn append(
        &self,
        order_id: RecordId,
        amount: f64,
        reason: RevenueReason,
    ) -> RepoResult<RevenueEntry> {
        let entry = RevenueEntry {
            id: None,
            order_id,
            amount,
            reason,
            entered_at: shared::util::now_millis(),
        };
        let created: Option<RevenueEntry> =
            self.base.db().create(REVENUE_TABLE).content(entry).await?;
        created.ok_or_else(|| RepoError::Database("Failed to append revenue entry".to_string()))
    }

    /// Current revenue: fold of the signed ledger.
    pub async fn total(&self) -> RepoResult<f64> {
        let total: Option<f64> = self
            .base
            .db()
            .query("RETURN <float> math::sum((SELECT VALUE amount FROM revenue_entry))")
            .await?
            .take(0)?;
        Ok(total.unwrap_or(0.0))
    }

    /// Most recent entries, newest first.
    pub async fn list(&self, limit: i64) -> RepoResult<Vec<RevenueEntry>> {
        let limit = limit.clamp(1, 500);
        let entries: Vec<RevenueEntry> = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM revenue_entry ORDER BY entered_at DESC LIMIT {limit}"
            ))
            .await?
            .take(0)?;
        Ok(entries)
    }
}
