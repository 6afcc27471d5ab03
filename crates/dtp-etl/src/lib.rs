//! DTP ETL Library
//!
//! Extract-transform-load pipeline for drone traffic telemetry: pulls JSON
//! records from an external HTTP source, normalizes them into a
//! column-uniform batch, and persists each run as one object-store archive
//! plus one row per record in PostgreSQL.
//!
//! # Example
//!
//! ```no_run
//! use dtp_etl::{config::EtlConfig, pipeline::PipelineRunner};
//! use dtp_common::{db::DatabaseConfig, storage::{config::StorageConfig, Storage}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EtlConfig::from_env()?;
//!     let storage = Storage::new(StorageConfig::from_env()?);
//!     let pool = DatabaseConfig::from_env()?.connect().await?;
//!
//!     let runner = PipelineRunner::new(&config, storage, pool)?;
//!     runner.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod scheduler;
pub mod sink;
pub mod transform;

pub use error::{EtlError, Result};
