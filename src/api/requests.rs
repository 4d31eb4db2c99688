//! Loan request endpoints: employee self-service and admin workflow

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::request::{
        CreateRequest, LoanRequest, RequestDetails, RequestQuery, RequestStatus, RequestStatusCounts,
    },
};

use super::AuthenticatedUser;

/// Paginated admin request listing
#[derive(Serialize, ToSchema)]
pub struct RequestListResponse {
    /// One page of requests
    pub items: Vec<RequestDetails>,
    /// Total number of matching requests
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Requests per page
    pub per_page: i64,
    /// Total number of pages
    pub total_pages: i64,
}

/// Lifecycle transition payload
#[derive(Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status: aprobada, rechazada or devuelta
    pub status: RequestStatus,
}

/// List the calling user's requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's requests, newest first", body = Vec<RequestDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.my_requests(&claims.sub).await?;
    Ok(Json(requests))
}

/// Create a loan request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created in pendiente", body = LoanRequest),
        (status = 400, description = "Missing justification or unknown tool"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<LoanRequest>)> {
    let request = state.services.requests.create_request(&claims.sub, &payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// The calling user's request counts by status
#[utoipa::path(
    get,
    path = "/requests/stats",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts grouped by status", body = RequestStatusCounts),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_request_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RequestStatusCounts>> {
    let stats = state.services.requests.my_stats(&claims.sub).await?;
    Ok(Json(stats))
}

/// List all requests (admin)
#[utoipa::path(
    get,
    path = "/admin/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Paginated requests with requester info", body = RequestListResponse),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn list_all_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<RequestListResponse>> {
    claims.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(10).clamp(1, 100);

    let (items, total) = state.services.requests.list_all(&query).await?;

    Ok(Json(RequestListResponse {
        items,
        total,
        page,
        per_page,
        total_pages: (total + per_page - 1) / per_page,
    }))
}

/// Apply a lifecycle transition to a request (admin)
#[utoipa::path(
    put,
    path = "/admin/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Request transitioned", body = LoanRequest),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Transition not permitted from the current status")
    )
)]
pub async fn transition_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<LoanRequest>> {
    claims.require_admin()?;
    let request = state.services.requests.transition(id, payload.status).await?;
    Ok(Json(request))
}
