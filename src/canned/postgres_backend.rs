//! PostgreSQL-backed canned response storage.
//!
//! Persists responses in the `canned_responses` table (see `migrations/`).
//! Shortcuts are a `TEXT[]` column with a GIN index; variables are stored
//! as `JSONB`. The usage counter is advanced with a SQL-side increment so
//! concurrent calls are serialized by the database, never read-modify-write
//! in application code.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::backend::{CannedResponseBackend, SEARCH_RESULT_LIMIT};
use super::types::{
    CannedResponse, CannedResponseError, CannedResponseResult, UpdateCannedResponseRequest,
    VariableValue,
};

/// Row representation of a canned response.
#[derive(sqlx::FromRow)]
struct CannedResponseRow {
    id: Uuid,
    organization_id: String,
    name: String,
    content: String,
    category: Option<String>,
    shortcuts: Vec<String>,
    variables: Json<BTreeMap<String, VariableValue>>,
    usage_count: i64,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CannedResponseRow> for CannedResponse {
    fn from(row: CannedResponseRow) -> Self {
        CannedResponse {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            content: row.content,
            category: row.category,
            shortcuts: row.shortcuts,
            variables: row.variables.0,
            usage_count: row.usage_count,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escape LIKE/ILIKE metacharacters so user queries match literally.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// PostgreSQL canned response backend.
pub struct PostgresCannedResponseBackend {
    pool: PgPool,
}

impl PostgresCannedResponseBackend {
    /// Create a backend over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CannedResponseBackend for PostgresCannedResponseBackend {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, response: CannedResponse) -> CannedResponseResult<CannedResponse> {
        response.validate()?;

        sqlx::query(
            r#"
            INSERT INTO canned_responses
                (id, organization_id, name, content, category, shortcuts,
                 variables, usage_count, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(response.id)
        .bind(&response.organization_id)
        .bind(&response.name)
        .bind(&response.content)
        .bind(&response.category)
        .bind(&response.shortcuts)
        .bind(Json(&response.variables))
        .bind(response.usage_count)
        .bind(&response.created_by)
        .bind(response.created_at)
        .bind(response.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            response_id = %response.id,
            organization_id = %response.organization_id,
            "Canned response created in PostgreSQL"
        );

        Ok(response)
    }

    async fn get(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<CannedResponse> {
        let row: Option<CannedResponseRow> = sqlx::query_as(
            r#"
            SELECT * FROM canned_responses
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CannedResponse::from)
            .ok_or(CannedResponseError::NotFound(id))
    }

    async fn list(
        &self,
        organization_id: &str,
        category: Option<&str>,
    ) -> CannedResponseResult<Vec<CannedResponse>> {
        let rows: Vec<CannedResponseRow> = match category {
            Some(category) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM canned_responses
                    WHERE organization_id = $1 AND category = $2
                    ORDER BY category ASC NULLS LAST, name ASC
                    "#,
                )
                .bind(organization_id)
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM canned_responses
                    WHERE organization_id = $1
                    ORDER BY category ASC NULLS LAST, name ASC
                    "#,
                )
                .bind(organization_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(CannedResponse::from).collect())
    }

    async fn list_categories(&self, organization_id: &str) -> CannedResponseResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category FROM canned_responses
            WHERE organization_id = $1
              AND category IS NOT NULL
              AND category <> ''
            ORDER BY category ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn search(
        &self,
        organization_id: &str,
        query: &str,
    ) -> CannedResponseResult<Vec<CannedResponse>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows: Vec<CannedResponseRow> = sqlx::query_as(
            r#"
            SELECT * FROM canned_responses
            WHERE organization_id = $1
              AND (name ILIKE $2 OR content ILIKE $2 OR category ILIKE $2)
            LIMIT $3
            "#,
        )
        .bind(organization_id)
        .bind(&pattern)
        .bind(SEARCH_RESULT_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CannedResponse::from).collect())
    }

    async fn get_by_shortcut(
        &self,
        organization_id: &str,
        shortcut: &str,
    ) -> CannedResponseResult<Option<CannedResponse>> {
        // Duplicate shortcuts resolve to the oldest response
        let row: Option<CannedResponseRow> = sqlx::query_as(
            r#"
            SELECT * FROM canned_responses
            WHERE organization_id = $1 AND $2 = ANY(shortcuts)
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(organization_id)
        .bind(shortcut)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CannedResponse::from))
    }

    async fn update(
        &self,
        organization_id: &str,
        id: Uuid,
        updates: UpdateCannedResponseRequest,
    ) -> CannedResponseResult<CannedResponse> {
        let mut response = self.get(organization_id, id).await?;

        response.apply_update(updates);
        response.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE canned_responses
            SET name = $3, content = $4, category = $5, shortcuts = $6,
                variables = $7, updated_at = $8
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .bind(&response.name)
        .bind(&response.content)
        .bind(&response.category)
        .bind(&response.shortcuts)
        .bind(Json(&response.variables))
        .bind(response.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CannedResponseError::NotFound(id));
        }

        Ok(response)
    }

    async fn delete(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM canned_responses
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CannedResponseError::NotFound(id));
        }

        Ok(())
    }

    async fn record_usage(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<()> {
        // Atomic SQL-side increment; the database serializes concurrent
        // callers so N calls always advance the counter by N.
        let result = sqlx::query(
            r#"
            UPDATE canned_responses
            SET usage_count = usage_count + 1, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CannedResponseError::NotFound(id));
        }

        Ok(())
    }

    async fn count(&self, organization_id: &str) -> CannedResponseResult<usize> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM canned_responses WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }
}
