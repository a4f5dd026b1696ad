//! Refund API module (admin-only)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/refund", refund_routes())
}

fn refund_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{order_id}", get(handler::get_by_order))
}
