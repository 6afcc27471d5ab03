//! DTP Server - Read API over the drone traffic stores
//!
//! Thin query layer on top of the same PostgreSQL database and object
//! store the ETL pipeline writes to. Shares connection configuration with
//! the pipeline but no runtime state.

pub mod api;
pub mod config;
pub mod middleware;
pub mod routes;

use dtp_common::storage::Storage;
use sqlx::PgPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Storage,
}
