//! Admin API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::RevenueSummary;
use crate::db::repository::RevenueRepository;
use crate::utils::AppResult;
use shared::UserRole;

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Current revenue (ledger fold) plus the most recent entries
pub async fn revenue(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<RevenueSummary>> {
    user.require_role(UserRole::Admin)?;
    let repo = RevenueRepository::new(state.db.clone());
    let total = repo.total().await?;
    let entries = repo.list(query.limit).await?;
    Ok(Json(RevenueSummary { total, entries }))
}
