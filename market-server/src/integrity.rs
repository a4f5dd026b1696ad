//! Integrity check job
//!
//! Periodic detector for the two invariants the write paths maintain:
//!
//! 1. for every product with variants, the stored aggregate equals the
//!    variant sum;
//! 2. the revenue ledger fold equals the sum of totals over orders
//!    currently `confirmed`.
//!
//! Detection only — violations are logged at WARN for operators; the
//! single stock write path and the append-only ledger are the enforcement.

use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::db::repository::{OrderRepository, ProductRepository, RepoResult, RevenueRepository};
use crate::orders::money;

/// One round of findings.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    /// Products whose stored aggregate diverged from the variant sum
    pub stock_violations: Vec<StockViolation>,
    /// (ledger fold, confirmed-order sum) when the two disagree
    pub revenue_drift: Option<(f64, f64)>,
}

#[derive(Debug)]
pub struct StockViolation {
    pub product_id: String,
    pub stored: i32,
    pub derived: i32,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.stock_violations.is_empty() && self.revenue_drift.is_none()
    }
}

#[derive(Clone)]
pub struct IntegrityChecker {
    products: ProductRepository,
    orders: OrderRepository,
    revenue: RevenueRepository,
}

impl IntegrityChecker {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            revenue: RevenueRepository::new(db),
        }
    }

    /// Run one full check.
    pub async fn run(&self) -> RepoResult<IntegrityReport> {
        let mut report = IntegrityReport::default();

        for product in self.products.find_with_variants().await? {
            let derived: i32 = product.variants.iter().map(|v| v.stock).sum();
            if product.stock != derived {
                report.stock_violations.push(StockViolation {
                    product_id: product
                        .id
                        .as_ref()
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                    stored: product.stock,
                    derived,
                });
            }
        }

        let ledger_total = self.revenue.total().await?;
        let confirmed_total = self.orders.sum_confirmed_totals().await?;
        if !money::money_eq(ledger_total, confirmed_total) {
            report.revenue_drift = Some((ledger_total, confirmed_total));
        }

        Ok(report)
    }

    /// Periodic loop until `token` is cancelled.
    pub async fn run_loop(self, interval: Duration, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            match self.run().await {
                Ok(report) if report.is_clean() => {
                    tracing::debug!("Integrity check clean");
                }
                Ok(report) => {
                    for v in &report.stock_violations {
                        tracing::warn!(
                            product = %v.product_id,
                            stored = v.stored,
                            derived = v.derived,
                            "Stock aggregate diverged from variant sum"
                        );
                    }
                    if let Some((ledger, confirmed)) = report.revenue_drift {
                        tracing::warn!(
                            ledger_total = ledger,
                            confirmed_total = confirmed,
                            "Revenue ledger diverged from confirmed orders"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Integrity check failed");
                }
            }
        }
    }
}
