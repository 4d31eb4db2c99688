//! Loan request service: creation, lifecycle transitions, notification fan-out

use std::collections::HashMap;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{CreateRequest, LoanRequest, RequestDetails, RequestQuery, RequestStatus, RequestStatusCounts},
        user::UserSummary,
    },
    repository::Repository,
    services::directory::DirectoryService,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    directory: DirectoryService,
}

impl RequestsService {
    pub fn new(repository: Repository, directory: DirectoryService) -> Self {
        Self { repository, directory }
    }

    /// Create a request in `pendiente` and notify administrators.
    ///
    /// The fan-out runs after the insert has committed and is best-effort:
    /// a directory or notification failure is logged, never surfaced.
    pub async fn create_request(&self, user_id: &str, payload: &CreateRequest) -> AppResult<LoanRequest> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if payload.justification.trim().is_empty() {
            return Err(AppError::Validation("La justificación es obligatoria.".to_string()));
        }

        // A missing tool is a bad payload, not a missing resource
        let tool = match self.repository.tools.get_by_id(payload.tool_id).await {
            Ok(tool) => tool,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Validation(format!(
                    "Tool {} does not exist",
                    payload.tool_id
                )))
            }
            Err(e) => return Err(e),
        };

        let request = self
            .repository
            .requests
            .create(user_id, tool.id, payload.justification.trim())
            .await?;

        let service = self.clone();
        let requester_id = user_id.to_string();
        let tool_name = tool.name;
        tokio::spawn(async move {
            if let Err(e) = service.notify_admins_of_new_request(&requester_id, &tool_name).await {
                tracing::warn!(requester = %requester_id, "Admin notification fan-out failed: {}", e);
            }
        });

        Ok(request)
    }

    /// Requests made by the calling user
    pub async fn my_requests(&self, user_id: &str) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_for_user(user_id).await
    }

    /// The calling user's request counts by status
    pub async fn my_stats(&self, user_id: &str) -> AppResult<RequestStatusCounts> {
        self.repository.requests.status_counts(Some(user_id)).await
    }

    /// All requests (admin view), with requester display info resolved
    /// through the identity directory
    pub async fn list_all(&self, query: &RequestQuery) -> AppResult<(Vec<RequestDetails>, i64)> {
        let (mut requests, total) = self.repository.requests.list_all(query).await?;

        let mut ids: Vec<String> = requests.iter().map(|r| r.user_id.clone()).collect();
        ids.sort();
        ids.dedup();

        if !ids.is_empty() {
            let users: HashMap<String, UserSummary> = self
                .directory
                .list_users_by_ids(&ids)
                .await?
                .into_iter()
                .map(|user| (user.id.clone(), UserSummary::from(user)))
                .collect();
            for request in &mut requests {
                request.user = users.get(&request.user_id).cloned();
            }
        }

        Ok((requests, total))
    }

    /// Apply a lifecycle transition and notify the requester.
    ///
    /// Status update and stock adjustment commit together (or not at all)
    /// inside the repository; the notification is dispatched afterwards and
    /// never rolls the transition back.
    pub async fn transition(&self, request_id: i32, target: RequestStatus) -> AppResult<LoanRequest> {
        let updated = self.repository.requests.apply_transition(request_id, target).await?;

        let service = self.clone();
        let request = updated.clone();
        tokio::spawn(async move {
            if let Err(e) = service.notify_requester(&request).await {
                tracing::warn!(request_id = request.id, "Requester notification failed: {}", e);
            }
        });

        Ok(updated)
    }

    async fn notify_admins_of_new_request(&self, requester_id: &str, tool_name: &str) -> AppResult<()> {
        let requester_name = self
            .directory
            .get_user(requester_id)
            .await
            .map(|user| user.display_name())
            .unwrap_or_else(|_| "Un usuario".to_string());

        let message = format!(
            "¡Nueva solicitud! \"{}\" ha solicitado \"{}\".",
            requester_name, tool_name
        );

        for admin_id in self.directory.list_admin_ids().await? {
            self.repository
                .notifications
                .create(&admin_id, &message, Some("/admin/requests"))
                .await?;
        }
        Ok(())
    }

    async fn notify_requester(&self, request: &LoanRequest) -> AppResult<()> {
        let tool_name = self
            .repository
            .tools
            .get_by_id(request.tool_id)
            .await
            .map(|tool| tool.name)
            .unwrap_or_else(|_| "una herramienta".to_string());

        let message = match request.status {
            RequestStatus::Approved => {
                format!("Tu solicitud de \"{}\" ha sido APROBADA.", tool_name)
            }
            RequestStatus::Rejected => {
                format!("Tu solicitud de \"{}\" ha sido RECHAZADA.", tool_name)
            }
            RequestStatus::Returned => {
                format!("Has devuelto la herramienta \"{}\".", tool_name)
            }
            RequestStatus::Pending => return Ok(()),
        };

        self.repository
            .notifications
            .create(&request.user_id, &message, Some("/dashboard"))
            .await?;
        Ok(())
    }
}
