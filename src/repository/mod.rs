//! Repository layer for database operations

pub mod notifications;
pub mod requests;
pub mod tools;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub tools: tools::ToolsRepository,
    pub requests: requests::RequestsRepository,
    pub notifications: notifications::NotificationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        let tools = tools::ToolsRepository::new(pool.clone());
        Self {
            requests: requests::RequestsRepository::new(pool.clone(), tools.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            tools,
            pool,
        }
    }
}
