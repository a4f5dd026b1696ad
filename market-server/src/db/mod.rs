//! Database module
//!
//! Embedded SurrealDB: RocksDB-backed in production, in-memory for tests.
//! Orders are looked up by buyer/seller at query time (no denormalized
//! back-reference arrays), so those fields get indexes at startup; the
//! unique index on `refund.orderId` backstops the 1:1 order↔refund rule.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "market";
const DATABASE: &str = "market";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `db_path`.
    pub async fn open(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::prepare(db).await
    }

    /// In-memory database, used by tests and local experiments.
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_indexes(&db).await?;
        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }
}

/// Index definitions, idempotent.
async fn define_indexes(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS order_buyer_idx ON TABLE order COLUMNS buyer;
        DEFINE INDEX IF NOT EXISTS order_seller_idx ON TABLE order COLUMNS seller;
        DEFINE INDEX IF NOT EXISTS order_status_idx ON TABLE order COLUMNS status;
        DEFINE INDEX IF NOT EXISTS refund_order_idx ON TABLE refund COLUMNS orderId UNIQUE;
        DEFINE INDEX IF NOT EXISTS revenue_order_idx ON TABLE revenue_entry COLUMNS order_id;
        "#,
    )
    .await
    .and_then(|response| response.check())
    .map_err(|e| AppError::database(format!("Failed to define indexes: {e}")))?;
    Ok(())
}
