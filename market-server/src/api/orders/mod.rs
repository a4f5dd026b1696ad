//! Order API module
//!
//! Checkout is a multipart request (JSON payload + optional payment
//! screenshot), so this router carries a raised body limit.

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Multipart checkout: 5MB screenshot plus payload headroom
const MAX_CHECKOUT_BODY: usize = 8 * 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/order", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/create", post(handler::create))
        .route("/buyer", get(handler::list_buyer))
        .route("/seller", get(handler::list_seller))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/delivery", patch(handler::update_delivery))
        .route("/{id}/cancel", patch(handler::cancel))
        .route("/{id}/payment", patch(handler::approve_payment))
        .layer(DefaultBodyLimit::max(MAX_CHECKOUT_BODY))
}
