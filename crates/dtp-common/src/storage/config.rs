use serde::{Deserialize, Serialize};
use std::env;

/// Default region used for MinIO deployments (MinIO ignores it but the SDK
/// requires one).
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    /// Load storage configuration from the environment.
    ///
    /// - `MINIO_ENDPOINT`: e.g. `http://localhost:9000` (unset means AWS)
    /// - `MINIO_ACCESS_KEY` / `MINIO_SECRET_KEY`: credentials, falling back
    ///   to the standard `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
    /// - `MINIO_REGION`: region, defaults to `us-east-1`
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: env::var("MINIO_ENDPOINT").ok(),
            region: env::var("MINIO_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            access_key: env::var("MINIO_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("MINIO_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .unwrap_or_else(|_| "minioadmin".to_string()),
            // MinIO requires path-style addressing; virtual-hosted style
            // only works against real AWS endpoints.
            path_style: env::var("MINIO_ENDPOINT").is_ok(),
        })
    }

    pub fn for_minio(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            region: DEFAULT_REGION.to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        }
    }
}
