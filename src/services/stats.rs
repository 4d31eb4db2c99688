//! Dashboard statistics service

use crate::{
    api::stats::{DashboardStats, ToolStats, UserStats},
    error::AppResult,
    repository::Repository,
    services::directory::DirectoryService,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    directory: DirectoryService,
}

impl StatsService {
    pub fn new(repository: Repository, directory: DirectoryService) -> Self {
        Self { repository, directory }
    }

    /// Admin dashboard aggregates: requests by status, inventory totals,
    /// and directory user counts by role
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let requests = self.repository.requests.status_counts(None).await?;

        let total_tools = self.repository.tools.count().await?;
        let total_on_loan = self.repository.tools.sum_on_loan().await?;
        let available_tools = self.repository.tools.count_with_available_stock().await?;

        let (total_users, admins, employees) = self.directory.role_counts().await?;

        Ok(DashboardStats {
            requests,
            tools: ToolStats {
                total_tools,
                total_on_loan,
                available_tools,
            },
            users: UserStats {
                total_users,
                admins,
                employees,
            },
        })
    }
}
