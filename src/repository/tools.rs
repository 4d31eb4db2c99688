//! Tools repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::tool::{CreateTool, Tool, UpdateTool},
};

#[derive(Clone)]
pub struct ToolsRepository {
    pool: Pool<Postgres>,
}

impl ToolsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List tools, newest first, optionally filtered by a search term
    /// matched against name and description
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Tool>> {
        let tools = match search {
            Some(term) => {
                sqlx::query_as::<_, Tool>(
                    r#"
                    SELECT * FROM tools
                    WHERE name ILIKE $1 OR description ILIKE $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(format!("%{}%", term))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Tool>("SELECT * FROM tools ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(tools)
    }

    /// Get tool by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Tool> {
        sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tool {} not found", id)))
    }

    /// Create a tool
    pub async fn create(&self, data: &CreateTool) -> AppResult<Tool> {
        let result = sqlx::query_as::<_, Tool>(
            r#"
            INSERT INTO tools (name, description, image_url, stock_total)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(data.stock_total)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(tool) => Ok(tool),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                AppError::Conflict(format!("Tool \"{}\" already exists", data.name)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Update a tool (partial)
    pub async fn update(&self, id: i32, data: &UpdateTool) -> AppResult<Tool> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.image_url, "image_url");
        add_field!(data.stock_total, "stock_total");

        let query = format!("UPDATE tools SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut builder = sqlx::query_as::<_, Tool>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.image_url);
        bind_field!(data.stock_total);

        let result = builder.fetch_optional(&self.pool).await;

        match result {
            Ok(Some(tool)) => Ok(tool),
            Ok(None) => Err(AppError::NotFound(format!("Tool {} not found", id))),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict("A tool with that name already exists".to_string()))
            }
            Err(sqlx::Error::Database(db)) if db.is_check_violation() => Err(AppError::Validation(
                "stock_total cannot be lower than the units currently on loan".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a tool. Requests referencing it are left in place.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tool {} not found", id)));
        }
        Ok(())
    }

    /// Lend out one unit. Guarded so `stock_on_loan` never exceeds
    /// `stock_total`; called only by the lifecycle engine, inside its
    /// transaction.
    pub async fn increment_on_loan<'e, E>(&self, executor: E, tool_id: i32) -> AppResult<()>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tools
            SET stock_on_loan = stock_on_loan + 1, updated_at = NOW()
            WHERE id = $1 AND stock_on_loan < stock_total
            "#,
        )
        .bind(tool_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::StockExhausted(format!(
                "Tool {} has no units available to lend",
                tool_id
            )));
        }
        Ok(())
    }

    /// Take back one unit. Guarded so `stock_on_loan` never goes negative.
    pub async fn decrement_on_loan<'e, E>(&self, executor: E, tool_id: i32) -> AppResult<()>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tools
            SET stock_on_loan = stock_on_loan - 1, updated_at = NOW()
            WHERE id = $1 AND stock_on_loan > 0
            "#,
        )
        .bind(tool_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Tool {} has no units on loan to return",
                tool_id
            )));
        }
        Ok(())
    }

    /// Count all tools
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tools")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count tools with at least one unit on the shelf
    pub async fn count_with_available_stock(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tools WHERE stock_total > stock_on_loan")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Total units currently lent out across the inventory
    pub async fn sum_on_loan(&self) -> AppResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(stock_on_loan), 0)::bigint FROM tools")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}
