//! Order API handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CancelRequest, Order, OrderCreate, UpdateStatusRequest};
use crate::db::repository::OrderRepository;
use crate::orders::screenshot::save_payment_screenshot;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::{OrderStatus, UserRole};

/// Query params for listing orders
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

/// Checkout: multipart with a JSON `payload` part and an optional
/// `screenshot` file part. Buyer-only.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<Order>> {
    user.require_role(UserRole::Buyer)?;

    let mut payload: Option<OrderCreate> = None;
    let mut screenshot: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("payload") => {
                let text = field.text().await?;
                payload = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::validation(format!("Malformed payload: {e}")))?,
                );
            }
            Some("screenshot") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("screenshot.png")
                    .to_string();
                let bytes = field.bytes().await?;
                screenshot = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let payload = payload.ok_or_else(|| AppError::validation("Missing payload part"))?;

    // Screenshot persistence must not block checkout; failures are logged
    // and the order is created without one.
    let screenshot_path = screenshot.and_then(|(name, data)| {
        match save_payment_screenshot(&state.config.uploads_dir(), &name, &data) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "Payment screenshot rejected, continuing checkout");
                None
            }
        }
    });

    let order = state
        .checkout
        .place_order(&user.id, payload, screenshot_path)
        .await?;
    Ok(Json(order))
}

/// Orders of the calling buyer
pub async fn list_buyer(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    user.require_role(UserRole::Buyer)?;
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo
        .find_by_buyer(&user.id, query.limit, query.offset)
        .await?;
    Ok(Json(orders))
}

/// Orders of the calling seller
pub async fn list_seller(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    user.require_role(UserRole::Seller)?;
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo
        .find_by_seller(&user.id, query.limit, query.offset)
        .await?;
    Ok(Json(orders))
}

/// Order detail, visible to its buyer, its seller and admins
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle.get(&id).await?;
    let allowed = user.role == UserRole::Admin
        || order.is_buyer(&user.id)
        || order.is_seller(&user.id);
    if !allowed {
        return Err(AppError::forbidden("Not your order"));
    }
    Ok(Json(order))
}

/// Seller acknowledgement: `placed` / `confirmed`
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    user.require_role(UserRole::Seller)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    if !matches!(payload.status, OrderStatus::Placed | OrderStatus::Confirmed) {
        return Err(AppError::validation(
            "Status endpoint only accepts placed or confirmed",
        ));
    }

    ensure_seller(&state, &id, &user).await?;
    let order = state
        .lifecycle
        .transition(&id, payload.status, &user.id, payload.note)
        .await?;
    Ok(Json(order))
}

/// Seller delivery flow: processing / shipped / delivered / returned,
/// validated against the transition table
pub async fn update_delivery(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    user.require_role(UserRole::Seller)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    if !payload.status.is_delivery_stage() {
        return Err(AppError::validation(format!(
            "{} is not a delivery status",
            payload.status
        )));
    }

    ensure_seller(&state, &id, &user).await?;
    let order = state
        .lifecycle
        .transition(&id, payload.status, &user.id, payload.note)
        .await?;
    Ok(Json(order))
}

/// Buyer cancellation, permitted from `pending` and `confirmed`
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> AppResult<Json<Order>> {
    user.require_role(UserRole::Buyer)?;
    let note = payload.and_then(|Json(p)| p.note);
    validate_optional_text(&note, "note", MAX_NOTE_LEN)?;

    let order = state.lifecycle.get(&id).await?;
    if !order.is_buyer(&user.id) {
        return Err(AppError::forbidden("Not your order"));
    }

    let order = state
        .lifecycle
        .transition(&id, OrderStatus::Cancelled, &user.id, note)
        .await?;
    Ok(Json(order))
}

/// Admin payment approval after reviewing the uploaded screenshot
pub async fn approve_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    user.require_role(UserRole::Admin)?;
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.set_payment_confirmed(&id, true).await?;
    Ok(Json(order))
}

async fn ensure_seller(state: &ServerState, order_id: &str, user: &CurrentUser) -> AppResult<()> {
    let order = state.lifecycle.get(order_id).await?;
    if !order.is_seller(&user.id) {
        return Err(AppError::forbidden("Not your order"));
    }
    Ok(())
}
