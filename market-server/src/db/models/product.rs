//! Product model
//!
//! Wire contract note: product documents are served to the storefront
//! as-is, so fields serialize camelCase (`soldCount`, `isActive`).
//!
//! Stock invariant: when `variants` is non-empty, `stock` is a cache of
//! the variant sum, recomputed on every stock mutation. All stock writes
//! go through the reconciliation functions in `orders::stock`.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{ProductStatus, VariantStock};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Record link to the owning seller
    #[serde(with = "serde_helpers::record_id")]
    pub seller: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    /// Aggregate stock; derived from `variants` whenever variants exist
    pub stock: i32,
    #[serde(default)]
    pub variants: Vec<VariantStock>,
    #[serde(default)]
    pub sold_count: i32,
    #[serde(default = "default_status")]
    pub status: ProductStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_status() -> ProductStatus {
    ProductStatus::Pending
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Active, approved products are the only ones that can be ordered.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.status == ProductStatus::Approved
    }
}

/// Create payload (seller). New products always start `pending`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub variants: Vec<VariantStock>,
}

/// Update payload (seller). Absent fields are left untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub variants: Option<Vec<VariantStock>>,
    pub is_active: Option<bool>,
}
