//! Route registration

pub mod health;
pub mod query;
pub mod storage;

use axum::{routing::get, routing::post, Json, Router};
use serde_json::json;

use crate::config::Config;
use crate::middleware;
use crate::AppState;

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .route("/query", post(query::execute_query_handler))
        .route("/storage/buckets", get(storage::list_buckets_handler))
        .route(
            "/storage/object/:bucket/*key",
            get(storage::read_object_handler),
        )
        .with_state(state)
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Root handler
async fn root() -> Json<serde_json::Value> {
    Json(json!({"message": "Welcome to Drone Traffic API"}))
}
