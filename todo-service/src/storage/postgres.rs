//! PostgreSQL storage adapter
//!
//! Queries are checked at runtime (`sqlx::query_as`), so building the crate
//! never needs a live database.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::StorageConfig;
use crate::domain::Todo;
use crate::error::{Error, Result};
use crate::ids::TodoId;
use crate::pagination::{Page, PageRequest, SortDirection};
use crate::repository::{Repository, RepositoryError, RepositoryOperation, RepositoryResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    completed   BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
)
"#;

const COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

/// Row shape of the `todos` table
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TodoRow {
    fn into_todo(self, operation: RepositoryOperation) -> RepositoryResult<Todo> {
        let id = self.id.parse::<TodoId>().map_err(|e| {
            RepositoryError::serialization_error(operation, e.to_string())
                .with_entity("Todo", self.id.clone())
        })?;
        Ok(Todo::restore(
            id,
            self.title,
            self.description,
            self.completed,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Map a sortable field name to its column
fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("id"),
        "title" => Some("title"),
        "description" => Some("description"),
        "completed" => Some("completed"),
        "createdAt" | "created_at" => Some("created_at"),
        "updatedAt" | "updated_at" => Some("updated_at"),
        _ => None,
    }
}

/// Build the ORDER BY clause for a page request
///
/// Only whitelisted column names ever reach the SQL text.
fn order_clause(request: &PageRequest) -> String {
    match request
        .sort()
        .and_then(|s| sort_column(s.field()).map(|c| (c, s.direction())))
    {
        Some((column, SortDirection::Desc)) => {
            format!("ORDER BY {column} DESC, id COLLATE \"C\" ASC")
        }
        Some((column, SortDirection::Asc)) => {
            format!("ORDER BY {column} ASC, id COLLATE \"C\" ASC")
        }
        None => "ORDER BY id COLLATE \"C\" ASC".to_string(),
    }
}

/// Classify a sqlx error into a repository error
fn classify(operation: RepositoryOperation, err: sqlx::Error) -> RepositoryError {
    use sqlx::Error as E;
    match err {
        E::PoolTimedOut => RepositoryError::timeout(operation, "Connection pool timed out"),
        E::PoolClosed => RepositoryError::connection_failed("Connection pool is closed")
            .with_operation(operation),
        E::Io(e) => RepositoryError::connection_failed(e.to_string()).with_operation(operation),
        E::Tls(e) => {
            RepositoryError::connection_failed(format!("TLS error: {}", e)).with_operation(operation)
        }
        E::WorkerCrashed => RepositoryError::connection_failed("Database worker crashed")
            .with_operation(operation),
        E::ColumnDecode { index, source } => RepositoryError::serialization_error(
            operation,
            format!("Failed to decode column {}: {}", index, source),
        ),
        E::Decode(e) => RepositoryError::serialization_error(operation, e.to_string()),
        E::Database(db_err) => {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
            {
                RepositoryError::constraint_violation(operation, db_err.to_string())
            } else {
                RepositoryError::database_error(operation, db_err.to_string())
            }
        }
        other => RepositoryError::database_error(operation, other.to_string()),
    }
}

/// Sanitize connection URL for safe logging (remove password)
fn sanitize_connection_url(url: &str) -> String {
    if let (Some(scheme_end), Some(at_pos)) = (url.find("://"), url.rfind('@')) {
        if at_pos < scheme_end + 3 {
            return url.to_string();
        }
        let credentials = &url[scheme_end + 3..at_pos];
        if let Some(colon_pos) = credentials.find(':') {
            return format!(
                "{}{}:***{}",
                &url[..scheme_end + 3],
                &credentials[..colon_pos],
                &url[at_pos..]
            );
        }
    }
    url.to_string()
}

/// Todo storage backed by a PostgreSQL `todos` table
#[derive(Debug, Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the storage configuration
    ///
    /// Retries with exponential backoff up to `max_retries` times.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| Error::config("storage.url is required for the postgres backend"))?;

        let base_delay = Duration::from_secs(config.retry_delay_secs);
        let mut attempt = 0u32;
        loop {
            let result = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
                .connect(url)
                .await;

            match result {
                Ok(pool) => {
                    tracing::info!(
                        url = %sanitize_connection_url(url),
                        max_connections = config.max_connections,
                        attempts = attempt + 1,
                        "Database connection pool created"
                    );
                    return Ok(Self::new(pool));
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > config.max_retries {
                        tracing::error!(
                            "Failed to connect to database at '{}' after {} attempts: {}",
                            sanitize_connection_url(url),
                            attempt,
                            e
                        );
                        return Err(Error::Repository(classify(RepositoryOperation::FindAll, e)));
                    }

                    let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1).min(16));
                    tracing::warn!(
                        "Database connection attempt {} failed: {}. Retrying in {:?}...",
                        attempt,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Create the `todos` table if it does not exist
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(RepositoryOperation::Save, e))?;
        Ok(())
    }

    /// Cheap round trip used by the readiness probe
    pub async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| classify(RepositoryOperation::Count, e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Repository<TodoId, Todo> for PgTodoRepository {
    async fn save(&self, entity: Todo) -> RepositoryResult<Todo> {
        let id = entity
            .id()
            .cloned()
            .ok_or_else(|| RepositoryError::validation_failed("Todo has no identifier"))?;

        sqlx::query(
            "INSERT INTO todos (id, title, description, completed, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                completed = EXCLUDED.completed, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at",
        )
        .bind(id.as_str())
        .bind(entity.title())
        .bind(entity.description())
        .bind(entity.completed())
        .bind(entity.created_at())
        .bind(entity.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| classify(RepositoryOperation::Save, e).with_entity("Todo", id.as_str()))?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<Todo>> {
        let row: Option<TodoRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM todos WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    classify(RepositoryOperation::FindById, e).with_entity("Todo", id.as_str())
                })?;
        row.map(|r| r.into_todo(RepositoryOperation::FindById))
            .transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Todo>> {
        let rows: Vec<TodoRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM todos ORDER BY id COLLATE \"C\" ASC"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| classify(RepositoryOperation::FindAll, e))?;
        rows.into_iter()
            .map(|r| r.into_todo(RepositoryOperation::FindAll))
            .collect()
    }

    async fn find_page(&self, request: &PageRequest) -> RepositoryResult<Page<Todo>> {
        let total = self.count().await?;
        let sql = format!(
            "SELECT {COLUMNS} FROM todos {} LIMIT $1 OFFSET $2",
            order_clause(request)
        );
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let rows: Vec<TodoRow> = sqlx::query_as(&sql)
            .bind(i64::from(request.size()))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(RepositoryOperation::FindPage, e))?;
        let content = rows
            .into_iter()
            .map(|r| r.into_todo(RepositoryOperation::FindPage))
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::new(content, request, total))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(RepositoryOperation::Count, e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn exists_by_id(&self, id: &TodoId) -> RepositoryResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM todos WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(RepositoryOperation::Exists, e).with_entity("Todo", id.as_str()))
    }

    async fn delete_by_id(&self, id: &TodoId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(RepositoryOperation::Delete, e).with_entity("Todo", id.as_str()))?;
        Ok(result.rows_affected() > 0)
    }
}
