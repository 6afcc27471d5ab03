//! Shared infrastructure for the Drone Traffic Platform
//!
//! This crate holds the pieces used by both the ETL pipeline and the read
//! API server:
//!
//! - **logging**: centralized tracing setup (console/file, text/JSON)
//! - **storage**: S3/MinIO object store client wrapper
//! - **db**: PostgreSQL connection configuration and pool construction

pub mod db;
pub mod logging;
pub mod storage;
