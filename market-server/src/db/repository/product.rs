//! Product repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use shared::{ProductStatus, VariantStock};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Storefront catalog: active, approved products, newest first.
    pub async fn find_all(&self, limit: i64, offset: i64) -> RepoResult<Vec<Product>> {
        let limit = limit.clamp(1, 200);
        let offset = offset.max(0);
        let products: Vec<Product> = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM product WHERE isActive = true AND status = 'approved' \
                 ORDER BY createdAt DESC LIMIT {limit} START {offset}"
            ))
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    /// Products carrying variant buckets (integrity checks walk these).
    pub async fn find_with_variants(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE array::len(variants) > 0")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Create a new product for `seller`. Aggregate stock is derived from
    /// the variant sum whenever variants are provided.
    pub async fn create(&self, seller: RecordId, data: ProductCreate) -> RepoResult<Product> {
        let stock = if data.variants.is_empty() {
            data.stock
        } else {
            variant_sum(&data.variants)
        };
        let product = Product {
            id: None,
            seller,
            name: data.name,
            description: data.description,
            price: data.price,
            stock,
            variants: data.variants,
            sold_count: 0,
            status: ProductStatus::Pending,
            is_active: true,
            created_at: shared::util::now_millis(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Partial update. When `variants` is present the aggregate stock is
    /// recomputed from it, discarding any client-provided `stock`. A bare
    /// `stock` value is rejected while the product carries variant
    /// buckets; the aggregate is derived, not client-settable.
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let rid = record_id(PRODUCT_TABLE, id)?;

        if data.stock.is_some() && data.variants.is_none() {
            let existing = self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;
            if existing.has_variants() {
                return Err(RepoError::Validation(
                    "stock is derived from variants; update variants to change stock".to_string(),
                ));
            }
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.is_active.is_some() {
            set_parts.push("isActive = $is_active");
        }
        match (&data.variants, data.stock) {
            (Some(_), _) => set_parts.push("variants = $variants, stock = $stock"),
            (None, Some(_)) => set_parts.push("stock = $stock"),
            (None, None) => {}
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.is_active {
            query = query.bind(("is_active", v));
        }
        match (data.variants, data.stock) {
            (Some(variants), _) => {
                let stock = variant_sum(&variants);
                query = query.bind(("variants", variants)).bind(("stock", stock));
            }
            (None, Some(stock)) => {
                query = query.bind(("stock", stock));
            }
            (None, None) => {}
        }

        let products: Vec<Product> = query.await?.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Admin approval: `pending` → `approved`.
    pub async fn approve(&self, id: &str) -> RepoResult<Product> {
        let rid = record_id(PRODUCT_TABLE, id)?;
        let products: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $id SET status = 'approved' RETURN AFTER")
            .bind(("id", rid))
            .await?
            .take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Persist a stock mutation computed by `orders::stock`, adjusting
    /// `soldCount` by `sold_delta` in the same write.
    pub async fn write_stock(
        &self,
        id: &RecordId,
        stock: i32,
        variants: Vec<VariantStock>,
        sold_delta: i32,
    ) -> RepoResult<Product> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "UPDATE $id SET stock = $stock, variants = $variants, \
                 soldCount += $sold_delta RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("stock", stock))
            .bind(("variants", variants))
            .bind(("sold_delta", sold_delta))
            .await?
            .take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}

fn variant_sum(variants: &[VariantStock]) -> i32 {
    variants.iter().map(|v| v.stock).sum()
}
