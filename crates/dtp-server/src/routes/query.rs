//! Query passthrough endpoint
//!
//! Executes a caller-supplied SQL query against the traffic database.
//! Unlike a raw passthrough, the statement is validated to read-only
//! shapes and run under a timeout before results are serialized to JSON.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{Column, PgPool, Row, TypeInfo, ValueRef};
use std::time::Duration;
use thiserror::Error;

use crate::api::{ApiResponse, ErrorResponse};
use crate::AppState;

/// Query execution timeout.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Request to execute a SQL query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteQueryRequest {
    /// SQL query to execute (must be SELECT or EXPLAIN)
    pub sql: String,
}

/// Response containing query results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteQueryResponse {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows (each row is a vector of JSON values)
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Errors that can occur during query execution
#[derive(Debug, Error)]
pub enum ExecuteQueryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Query timeout exceeded (30 seconds)")]
    Timeout,

    #[error("Query not allowed: {0}")]
    Forbidden(String),
}

#[tracing::instrument(
    skip(state, request),
    fields(sql_preview = %request.sql.chars().take(100).collect::<String>())
)]
pub async fn execute_query_handler(
    State(state): State<AppState>,
    Json(request): Json<ExecuteQueryRequest>,
) -> Result<Response, ExecuteQueryError> {
    let response = handle(&state.db, request).await?;

    tracing::info!(
        columns = response.columns.len(),
        rows = response.rows.len(),
        "Query executed successfully"
    );

    Ok(ApiResponse::success(response).into_response())
}

/// Execute a SQL query with validation and timeout
async fn handle(
    pool: &PgPool,
    request: ExecuteQueryRequest,
) -> Result<ExecuteQueryResponse, ExecuteQueryError> {
    validate_sql(&request.sql)?;

    let result = tokio::time::timeout(
        Duration::from_secs(QUERY_TIMEOUT_SECS),
        execute_sql(pool, &request.sql),
    )
    .await
    .map_err(|_| ExecuteQueryError::Timeout)??;

    Ok(result)
}

/// Validate SQL query for safety: read-only statements only.
fn validate_sql(sql: &str) -> Result<(), ExecuteQueryError> {
    let sql_upper = sql.trim().to_uppercase();

    if !sql_upper.starts_with("SELECT") && !sql_upper.starts_with("EXPLAIN") {
        return Err(ExecuteQueryError::Forbidden(
            "Only SELECT and EXPLAIN queries are allowed".to_string(),
        ));
    }

    let dangerous_keywords = [
        "DROP", "DELETE", "UPDATE", "INSERT", "TRUNCATE", "ALTER", "CREATE", "GRANT", "REVOKE",
        "EXECUTE", "CALL", "COPY",
    ];

    for keyword in &dangerous_keywords {
        if sql_upper.contains(keyword) {
            return Err(ExecuteQueryError::Forbidden(format!(
                "{} statements are not allowed",
                keyword
            )));
        }
    }

    Ok(())
}

/// Execute SQL query and convert results to JSON
async fn execute_sql(
    pool: &PgPool,
    sql: &str,
) -> Result<ExecuteQueryResponse, ExecuteQueryError> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;

    if rows.is_empty() {
        return Ok(ExecuteQueryResponse {
            columns: Vec::new(),
            rows: Vec::new(),
        });
    }

    let columns: Vec<String> = rows[0]
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();

    let mut result_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(columns.len());
        for (i, column) in row.columns().iter().enumerate() {
            values.push(column_value_to_json(row, i, column.type_info().name()));
        }
        result_rows.push(values);
    }

    Ok(ExecuteQueryResponse {
        columns,
        rows: result_rows,
    })
}

/// Best-effort conversion of one column value to JSON.
fn column_value_to_json(
    row: &sqlx::postgres::PgRow,
    index: usize,
    type_name: &str,
) -> serde_json::Value {
    if let Ok(raw) = row.try_get_raw(index) {
        if raw.is_null() {
            return serde_json::Value::Null;
        }
    }

    match type_name {
        "INT2" => row
            .try_get::<i16, _>(index)
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
        "INT4" => row
            .try_get::<i32, _>(index)
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
        "INT8" => row
            .try_get::<i64, _>(index)
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
        "FLOAT4" => row
            .try_get::<f32, _>(index)
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
        "FLOAT8" => row
            .try_get::<f64, _>(index)
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
        "BOOL" => row
            .try_get::<bool, _>(index)
            .map(|v| serde_json::json!(v))
            .unwrap_or(serde_json::Value::Null),
        "JSON" | "JSONB" => row
            .try_get::<serde_json::Value, _>(index)
            .unwrap_or(serde_json::Value::Null),
        "TIMESTAMPTZ" => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(index)
            .map(|v| serde_json::json!(v.to_rfc3339()))
            .unwrap_or(serde_json::Value::Null),
        _ => row
            .try_get::<String, _>(index)
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null),
    }
}

impl IntoResponse for ExecuteQueryError {
    fn into_response(self) -> Response {
        match self {
            ExecuteQueryError::Forbidden(msg) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", msg);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ExecuteQueryError::Timeout => {
                let error = ErrorResponse::new("TIMEOUT_ERROR", self.to_string());
                (StatusCode::REQUEST_TIMEOUT, Json(error)).into_response()
            },
            ExecuteQueryError::Database(ref e) => {
                tracing::error!("Database error during query execution: {}", e);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_allowed() {
        assert!(validate_sql("SELECT * FROM drone_traffic").is_ok());
        assert!(validate_sql("  select count(*) from drone_traffic").is_ok());
    }

    #[test]
    fn test_explain_is_allowed() {
        assert!(validate_sql("EXPLAIN SELECT 1").is_ok());
    }

    #[test]
    fn test_mutating_statements_are_forbidden() {
        assert!(validate_sql("DELETE FROM drone_traffic").is_err());
        assert!(validate_sql("SELECT 1; DROP TABLE drone_traffic").is_err());
        assert!(validate_sql("INSERT INTO drone_traffic VALUES (1)").is_err());
    }

    #[test]
    fn test_timeout_error_display() {
        let err = ExecuteQueryError::Timeout;
        assert!(err.to_string().contains("timeout"));
    }
}
