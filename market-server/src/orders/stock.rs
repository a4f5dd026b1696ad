//! Stock reconciliation
//!
//! The only code path that mutates product stock. Policy: whenever a
//! variant bucket is touched, the aggregate `stock` is re-derived as the
//! sum of the variant stocks, clobbering whatever was stored — the
//! buckets are the source of truth, the aggregate is a cache. A line
//! that names no variant works on the aggregate alone.
//!
//! [`StockLedger`] serializes every mutation behind an async mutex and,
//! on a partially failed reservation, restores the lines that already
//! went through before reporting the failure.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::models::{OrderItem, Product};
use crate::db::repository::ProductRepository;
use crate::orders::{OrderError, OrderResult};
use shared::VariantKey;

/// Recompute the aggregate as the variant sum. No-op for products
/// without variants (their aggregate is authoritative).
pub fn recompute_aggregate(product: &mut Product) {
    if product.has_variants() {
        product.stock = product.variants.iter().map(|v| v.stock).sum();
    }
}

/// True when `quantity` units of the requested variant (or of the
/// aggregate, for variant-less items) are on hand.
pub fn has_sufficient_stock(product: &Product, quantity: i32, variant: Option<&VariantKey>) -> bool {
    match variant {
        Some(key) => product
            .variants
            .iter()
            .find(|v| v.matches(key))
            .is_some_and(|v| v.stock >= quantity),
        None => product.stock >= quantity,
    }
}

/// Subtract `quantity` from the matched variant, floored at zero, then
/// re-derive the aggregate; a line with no variant subtracts from the
/// aggregate directly and the variant buckets are left alone.
pub fn apply_decrement(
    product: &mut Product,
    quantity: i32,
    variant: Option<&VariantKey>,
) -> OrderResult<()> {
    match variant {
        Some(key) => {
            let bucket = product
                .variants
                .iter_mut()
                .find(|v| v.matches(key))
                .ok_or_else(|| {
                    OrderError::Validation(format!(
                        "Variant ({}, {}) not found for {}",
                        key.color, key.size, product.name
                    ))
                })?;
            bucket.stock = (bucket.stock - quantity).max(0);
            recompute_aggregate(product);
        }
        None => {
            product.stock = (product.stock - quantity).max(0);
        }
    }
    Ok(())
}

/// Exact inverse of [`apply_decrement`]: add the quantity back, with the
/// aggregate re-derived only when a variant bucket took the restore.
pub fn apply_restore(
    product: &mut Product,
    quantity: i32,
    variant: Option<&VariantKey>,
) -> OrderResult<()> {
    match variant {
        Some(key) => {
            let bucket = product
                .variants
                .iter_mut()
                .find(|v| v.matches(key))
                .ok_or_else(|| {
                    OrderError::Validation(format!(
                        "Variant ({}, {}) not found for {}",
                        key.color, key.size, product.name
                    ))
                })?;
            bucket.stock += quantity;
            recompute_aggregate(product);
        }
        None => {
            product.stock += quantity;
        }
    }
    Ok(())
}

/// Serialized stock mutation service.
///
/// The embedded database is single-process, so an async mutex around the
/// read-modify-write cycle is sufficient to keep two concurrent checkouts
/// of the last unit from both passing the sufficiency check.
#[derive(Clone)]
pub struct StockLedger {
    products: ProductRepository,
    lock: Arc<Mutex<()>>,
}

impl StockLedger {
    pub fn new(products: ProductRepository) -> Self {
        Self {
            products,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Reserve stock for every line item and bump `soldCount`.
    ///
    /// Re-validates sufficiency under the lock; on the first failing line
    /// the lines already reserved are restored, so a rejected checkout
    /// leaves stock exactly as it found it.
    pub async fn reserve(&self, items: &[OrderItem]) -> OrderResult<()> {
        let _guard = self.lock.lock().await;

        let mut reserved: Vec<&OrderItem> = Vec::with_capacity(items.len());
        for item in items {
            match self.reserve_one(item).await {
                Ok(()) => reserved.push(item),
                Err(e) => {
                    self.restore_items(&reserved, -1).await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Restore stock for every line item of a cancelled order.
    /// `soldCount` stays put (the sale happened before it was undone).
    /// Failures are logged per line and do not interrupt the rest.
    pub async fn restore(&self, items: &[OrderItem]) {
        let _guard = self.lock.lock().await;
        let refs: Vec<&OrderItem> = items.iter().collect();
        self.restore_items(&refs, 0).await;
    }

    /// Roll back a reservation whose order never materialized: restore
    /// stock and revert the `soldCount` bump.
    pub async fn release(&self, items: &[OrderItem]) {
        let _guard = self.lock.lock().await;
        let refs: Vec<&OrderItem> = items.iter().collect();
        self.restore_items(&refs, -1).await;
    }

    async fn reserve_one(&self, item: &OrderItem) -> OrderResult<()> {
        let id = item.product.to_string();
        let mut product = self
            .products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Product {} not found", id)))?;

        if !has_sufficient_stock(&product, item.quantity, item.variant.as_ref()) {
            return Err(OrderError::Validation(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        apply_decrement(&mut product, item.quantity, item.variant.as_ref())?;

        self.products
            .write_stock(
                &item.product,
                product.stock,
                product.variants,
                item.quantity,
            )
            .await?;
        Ok(())
    }

    /// `sold_sign`: 0 keeps `soldCount` (post-cancellation restore, the
    /// sale happened), -1 reverts it (rollback of a failed reservation).
    async fn restore_items(&self, items: &[&OrderItem], sold_sign: i32) {
        for item in items {
            if let Err(e) = self.restore_one(item, sold_sign).await {
                tracing::error!(
                    product = %item.product,
                    error = %e,
                    "Failed to restore stock"
                );
            }
        }
    }

    async fn restore_one(&self, item: &OrderItem, sold_sign: i32) -> OrderResult<()> {
        let id = item.product.to_string();
        let mut product = self
            .products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Product {} not found", id)))?;

        apply_restore(&mut product, item.quantity, item.variant.as_ref())?;

        self.products
            .write_stock(
                &item.product,
                product.stock,
                product.variants,
                sold_sign * item.quantity,
            )
            .await?;
        Ok(())
    }
}
