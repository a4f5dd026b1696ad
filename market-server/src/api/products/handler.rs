//! Product API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{ProductRepository, record_id};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::UserRole;

/// Query params for listing products
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Public catalog: active, approved products
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all(query.limit, query.offset).await?;
    Ok(Json(products))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// Seller creates a product; it stays `pending` until an admin approves.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    user.require_role(UserRole::Seller)?;
    validate_product_create(&payload)?;

    let seller = record_id("user", &user.id)
        .map_err(|_| AppError::validation("Invalid seller id in token"))?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(seller, payload).await?;
    Ok(Json(product))
}

/// Seller updates an owned product. Stock edits are re-derived from the
/// variant sum when variants are supplied.
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    user.require_role(UserRole::Seller)?;
    validate_product_update(&payload)?;

    let repo = ProductRepository::new(state.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    if existing.seller.to_string() != user.id {
        return Err(AppError::forbidden("Product belongs to another seller"));
    }

    let product = repo.update(&id, payload).await?;
    Ok(Json(product))
}

/// Admin approval: `pending` → `approved`
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    user.require_role(UserRole::Admin)?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.approve(&id).await?;
    Ok(Json(product))
}

fn validate_product_create(payload: &ProductCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_price(payload.price)?;
    validate_stock_fields(payload.stock, &payload.variants)?;
    Ok(())
}

fn validate_product_update(payload: &ProductUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(stock) = payload.stock
        && stock < 0
    {
        return Err(AppError::validation("stock must not be negative"));
    }
    if let Some(variants) = &payload.variants {
        validate_variants(variants)?;
    }
    Ok(())
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("price must be a non-negative number"));
    }
    Ok(())
}

fn validate_stock_fields(stock: i32, variants: &[shared::VariantStock]) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::validation("stock must not be negative"));
    }
    validate_variants(variants)
}

fn validate_variants(variants: &[shared::VariantStock]) -> AppResult<()> {
    for v in variants {
        validate_required_text(&v.color, "variant.color", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&v.size, "variant.size", MAX_SHORT_TEXT_LEN)?;
        if v.stock < 0 {
            return Err(AppError::validation("variant stock must not be negative"));
        }
    }
    Ok(())
}
