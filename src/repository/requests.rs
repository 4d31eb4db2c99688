//! Loan requests repository: persistence and the lifecycle transactions

use sqlx::{Pool, Postgres, Row};

use super::tools::ToolsRepository;
use crate::{
    error::{AppError, AppResult},
    models::{
        request::{LoanRequest, RequestDetails, RequestQuery, RequestStatus, RequestStatusCounts},
        tool::ToolSummary,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
    tools: ToolsRepository,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>, tools: ToolsRepository) -> Self {
        Self { pool, tools }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanRequest> {
        sqlx::query_as::<_, LoanRequest>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Create a request in the initial `pendiente` state
    pub async fn create(&self, user_id: &str, tool_id: i32, justification: &str) -> AppResult<LoanRequest> {
        let request = sqlx::query_as::<_, LoanRequest>(
            r#"
            INSERT INTO requests (user_id, tool_id, justification)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tool_id)
        .bind(justification)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    /// Requests made by one user, newest first, with the tool embedded
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT r.*, t.id as t_id, t.name as t_name, t.description as t_description,
                   t.image_url as t_image_url, t.stock_total as t_stock_total,
                   t.stock_on_loan as t_stock_on_loan
            FROM requests r
            LEFT JOIN tools t ON t.id = r.tool_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_details).collect())
    }

    /// All requests, filterable by status and a search term over
    /// justification and tool name, paginated. Returns the page and the
    /// total matching count.
    pub async fn list_all(&self, query: &RequestQuery) -> AppResult<(Vec<RequestDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut conditions = vec!["1=1".to_string()];
        let mut idx = 1;

        if query.status.is_some() {
            conditions.push(format!("r.status = ${}", idx));
            idx += 1;
        }

        let search_pattern = query.search.as_ref().map(|term| format!("%{}%", term));
        if search_pattern.is_some() {
            conditions.push(format!(
                "(r.justification ILIKE ${i} OR t.name ILIKE ${i})",
                i = idx
            ));
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!(
            "SELECT COUNT(*) FROM requests r LEFT JOIN tools t ON t.id = r.tool_id WHERE {}",
            where_clause
        );
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(status) = query.status {
            count = count.bind(status);
        }
        if let Some(ref pattern) = search_pattern {
            count = count.bind(pattern);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT r.*, t.id as t_id, t.name as t_name, t.description as t_description,
                   t.image_url as t_image_url, t.stock_total as t_stock_total,
                   t.stock_on_loan as t_stock_on_loan
            FROM requests r
            LEFT JOIN tools t ON t.id = r.tool_id
            WHERE {}
            ORDER BY r.created_at DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause, limit, offset
        );
        let mut select = sqlx::query(&select_query);
        if let Some(status) = query.status {
            select = select.bind(status);
        }
        if let Some(ref pattern) = search_pattern {
            select = select.bind(pattern);
        }
        let rows = select.fetch_all(&self.pool).await?;

        Ok((rows.iter().map(Self::row_to_details).collect(), total))
    }

    /// Request counts grouped by status, for one user or globally
    pub async fn status_counts(&self, user_id: Option<&str>) -> AppResult<RequestStatusCounts> {
        let rows = match user_id {
            Some(user) => {
                sqlx::query(
                    "SELECT status, COUNT(*) as count FROM requests WHERE user_id = $1 GROUP BY status",
                )
                .bind(user)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT status, COUNT(*) as count FROM requests GROUP BY status")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut counts = RequestStatusCounts::default();
        for row in rows {
            let status: RequestStatus = row.get("status");
            let count: i64 = row.get("count");
            counts.record(status, count);
        }
        Ok(counts)
    }

    /// Apply one lifecycle transition atomically.
    ///
    /// The request update and the tool's counter adjustment run in a single
    /// transaction: both apply, or neither. The from-state is re-verified by
    /// the conditional UPDATE itself, so two concurrent approvals of the
    /// same pending request cannot both succeed.
    pub async fn apply_transition(
        &self,
        request_id: i32,
        target: RequestStatus,
    ) -> AppResult<LoanRequest> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, LoanRequest>("SELECT * FROM requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))?;

        let transition = current.status.transition_to(target).ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "Request {} cannot go from {} to {}",
                request_id, current.status, target
            ))
        })?;

        let update_query = format!(
            "UPDATE requests SET status = $1, {} = NOW() WHERE id = $2 AND status = $3 RETURNING *",
            transition.stamp.column_name()
        );
        let updated = sqlx::query_as::<_, LoanRequest>(&update_query)
            .bind(transition.to)
            .bind(request_id)
            .bind(transition.from)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                // A concurrent transition won the race between our read and
                // this update.
                AppError::InvalidTransition(format!(
                    "Request {} is no longer {}",
                    request_id, transition.from
                ))
            })?;

        match transition.stock_delta {
            1 => self.tools.increment_on_loan(&mut *tx, current.tool_id).await?,
            -1 => self.tools.decrement_on_loan(&mut *tx, current.tool_id).await?,
            _ => {}
        }

        tx.commit().await?;
        Ok(updated)
    }

    fn row_to_details(row: &sqlx::postgres::PgRow) -> RequestDetails {
        let tool = row
            .get::<Option<i32>, _>("t_id")
            .map(|tool_id| ToolSummary {
                id: tool_id,
                name: row.get("t_name"),
                description: row.get("t_description"),
                image_url: row.get("t_image_url"),
                stock_total: row.get("t_stock_total"),
                stock_on_loan: row.get("t_stock_on_loan"),
            });

        RequestDetails {
            id: row.get("id"),
            justification: row.get("justification"),
            status: row.get("status"),
            created_at: row.get("created_at"),
            approved_or_rejected_at: row.get("approved_or_rejected_at"),
            returned_at: row.get("returned_at"),
            tool,
            user: None,
            user_id: row.get("user_id"),
        }
    }
}
