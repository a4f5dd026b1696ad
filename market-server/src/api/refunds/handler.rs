//! Refund API handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Refund, RefundCreate};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::UserRole;

/// Record a refund for a cancelled order
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<RefundCreate>,
) -> AppResult<Json<Refund>> {
    user.require_role(UserRole::Admin)?;
    validate_required_text(&payload.method, "method", MAX_NAME_LEN)?;
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let refund = state.lifecycle.create_refund(&user.id, payload).await?;
    Ok(Json(refund))
}

/// Fetch the refund linked to an order
pub async fn get_by_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<Refund>> {
    user.require_role(UserRole::Admin)?;
    let refund = state
        .lifecycle
        .find_refund(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No refund for order {}", order_id)))?;
    Ok(Json(refund))
}
