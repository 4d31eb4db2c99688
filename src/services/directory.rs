//! Identity provider directory client
//!
//! Authentication and user records live in the external identity provider.
//! This client covers the read paths the server needs: resolving display
//! info for requesters and enumerating users by role.

use reqwest::{header, Client, StatusCode};

use crate::{
    config::IdentityConfig,
    error::{AppError, AppResult},
    models::user::{DirectoryUser, Role},
};

#[derive(Clone)]
pub struct DirectoryService {
    client: Client,
    config: IdentityConfig,
}

impl DirectoryService {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.config.directory_url.trim_end_matches('/'), path)
    }

    /// Fetch one user by id
    pub async fn get_user(&self, user_id: &str) -> AppResult<DirectoryUser> {
        let response = self
            .client
            .get(self.url(&format!("/users/{}", user_id)))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.directory_api_key))
            .send()
            .await
            .map_err(|e| AppError::Directory(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        response
            .error_for_status()
            .map_err(|e| AppError::Directory(e.to_string()))?
            .json::<DirectoryUser>()
            .await
            .map_err(|e| AppError::Directory(e.to_string()))
    }

    /// Fetch the whole user list
    pub async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        self.fetch_users(&[("limit", "500".to_string())]).await
    }

    /// Fetch a batch of users by id
    pub async fn list_users_by_ids(&self, user_ids: &[String]) -> AppResult<Vec<DirectoryUser>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<(&str, String)> = user_ids
            .iter()
            .map(|id| ("user_id", id.clone()))
            .collect();
        self.fetch_users(&params).await
    }

    /// Ids of every user holding the administrator role
    pub async fn list_admin_ids(&self) -> AppResult<Vec<String>> {
        let admins = self
            .list_users()
            .await?
            .into_iter()
            .filter(|user| user.role() == Role::Admin)
            .map(|user| user.id)
            .collect();
        Ok(admins)
    }

    /// (total, admins, employees) counts across the directory
    pub async fn role_counts(&self) -> AppResult<(i64, i64, i64)> {
        let users = self.list_users().await?;
        let total = users.len() as i64;
        let admins = users.iter().filter(|user| user.role() == Role::Admin).count() as i64;
        Ok((total, admins, total - admins))
    }

    async fn fetch_users(&self, params: &[(&str, String)]) -> AppResult<Vec<DirectoryUser>> {
        self.client
            .get(self.url("/users"))
            .query(params)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.directory_api_key))
            .send()
            .await
            .map_err(|e| AppError::Directory(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Directory(e.to_string()))?
            .json::<Vec<DirectoryUser>>()
            .await
            .map_err(|e| AppError::Directory(e.to_string()))
    }
}
