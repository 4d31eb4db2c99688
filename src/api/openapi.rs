//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, notifications, requests, stats, tools};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tool Crib API",
        version = "1.0.0",
        description = "Internal tool-lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Tools
        tools::list_tools,
        tools::get_tool,
        tools::create_tool,
        tools::update_tool,
        tools::delete_tool,
        // Requests
        requests::list_my_requests,
        requests::create_request,
        requests::my_request_stats,
        requests::list_all_requests,
        requests::transition_request,
        // Notifications
        notifications::list_notifications,
        notifications::mark_notification_read,
        // Stats
        stats::dashboard_stats,
    ),
    components(
        schemas(
            // Tools
            crate::models::tool::Tool,
            crate::models::tool::ToolSummary,
            crate::models::tool::CreateTool,
            crate::models::tool::UpdateTool,
            // Requests
            crate::models::request::LoanRequest,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            crate::models::request::CreateRequest,
            crate::models::request::RequestStatusCounts,
            crate::models::user::UserSummary,
            requests::RequestListResponse,
            requests::TransitionRequest,
            // Notifications
            crate::models::notification::Notification,
            // Stats
            stats::DashboardStats,
            stats::ToolStats,
            stats::UserStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tools", description = "Tool inventory management"),
        (name = "requests", description = "Loan request workflow"),
        (name = "notifications", description = "In-app notifications"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
