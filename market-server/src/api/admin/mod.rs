//! Admin API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/admin", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new().route("/revenue", get(handler::revenue))
}
