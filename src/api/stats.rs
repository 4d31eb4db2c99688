//! Admin dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::request::RequestStatusCounts};

use super::AuthenticatedUser;

/// Admin dashboard aggregates
#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    /// Request counts by status, across all users
    pub requests: RequestStatusCounts,
    /// Inventory totals
    pub tools: ToolStats,
    /// Directory user counts by role
    pub users: UserStats,
}

#[derive(Serialize, ToSchema)]
pub struct ToolStats {
    /// Number of tools in the inventory
    pub total_tools: i64,
    /// Units currently lent out, summed across tools
    pub total_on_loan: i64,
    /// Tools with at least one unit on the shelf
    pub available_tools: i64,
}

#[derive(Serialize, ToSchema)]
pub struct UserStats {
    pub total_users: i64,
    pub admins: i64,
    pub employees: i64,
}

/// Dashboard statistics (admin)
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardStats),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn dashboard_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    claims.require_admin()?;
    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}
