//! Tool management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::tool::{CreateTool, Tool, UpdateTool},
    repository::Repository,
};

#[derive(Clone)]
pub struct ToolsService {
    repository: Repository,
}

impl ToolsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List tools, optionally filtered by a search term
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Tool>> {
        self.repository.tools.list(search).await
    }

    /// Get a tool by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Tool> {
        self.repository.tools.get_by_id(id).await
    }

    /// Create a tool
    pub async fn create(&self, data: &CreateTool) -> AppResult<Tool> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.tools.create(data).await
    }

    /// Update a tool's descriptive fields or total stock
    pub async fn update(&self, id: i32, data: &UpdateTool) -> AppResult<Tool> {
        self.repository.tools.update(id, data).await
    }

    /// Delete a tool
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.tools.delete(id).await
    }
}
