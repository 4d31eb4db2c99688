//! Business logic services

pub mod directory;
pub mod notifications;
pub mod requests;
pub mod stats;
pub mod tools;

use crate::{config::IdentityConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub tools: tools::ToolsService,
    pub requests: requests::RequestsService,
    pub notifications: notifications::NotificationsService,
    pub stats: stats::StatsService,
    pub directory: directory::DirectoryService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, identity_config: IdentityConfig) -> Self {
        let directory = directory::DirectoryService::new(identity_config);
        Self {
            tools: tools::ToolsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone(), directory.clone()),
            notifications: notifications::NotificationsService::new(repository.clone()),
            stats: stats::StatsService::new(repository, directory.clone()),
            directory,
        }
    }
}
