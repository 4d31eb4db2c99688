//! Tool (inventory item) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Tool record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tool {
    pub id: i32,
    /// Tool name (unique)
    pub name: String,
    pub description: String,
    /// Opaque reference into the external media store
    pub image_url: String,
    /// Units owned
    pub stock_total: i32,
    /// Units currently lent out; only the lifecycle engine moves this
    pub stock_on_loan: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tool {
    /// Units still on the shelf
    pub fn stock_available(&self) -> i32 {
        self.stock_total - self.stock_on_loan
    }
}

/// Tool fields embedded in request listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub stock_total: i32,
    pub stock_on_loan: i32,
}

/// Create tool request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTool {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(length(min = 1, message = "La descripción es obligatoria."))]
    pub description: String,
    #[validate(length(min = 1, message = "La URL de la imagen es obligatoria."))]
    pub image_url: String,
    #[validate(range(min = 0, message = "El stock total es obligatorio."))]
    pub stock_total: i32,
}

/// Update tool request (partial)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTool {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stock_total: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_fails_validation() {
        let payload = CreateTool {
            name: String::new(),
            description: "Taladro percutor 18V".to_string(),
            image_url: "https://media.example/taladro.jpg".to_string(),
            stock_total: 3,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn available_stock_is_total_minus_on_loan() {
        let tool = Tool {
            id: 1,
            name: "Taladro".into(),
            description: "Taladro percutor 18V".into(),
            image_url: "https://media.example/taladro.jpg".into(),
            stock_total: 3,
            stock_on_loan: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(tool.stock_available(), 2);
    }
}
