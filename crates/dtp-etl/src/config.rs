//! ETL pipeline configuration (`DRONE_*` / `ETL_*` environment variables)

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{EtlError, Result};

/// Default service type tag used in archive paths.
pub const DEFAULT_SERVICE_TYPE: &str = "traffic-monitoring";

/// Default vendor tag used in archive paths.
pub const DEFAULT_VENDOR: &str = "drone-vendor";

/// Default scheduling interval in minutes.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// URL of the external telemetry source. Required.
    pub api_url: String,
    /// Service type tag, first component of the archive path.
    pub service_type: String,
    /// Vendor tag, second component of the archive path.
    pub vendor: String,
    /// Minutes between scheduled pipeline runs.
    pub interval_minutes: u64,
}

impl EtlConfig {
    /// Load configuration from the environment.
    ///
    /// - `DRONE_API_URL`: extraction endpoint — **required**, absence is a
    ///   fatal startup error
    /// - `SERVICE_TYPE`: defaults to `traffic-monitoring`
    /// - `VENDOR`: defaults to `drone-vendor`
    /// - `ETL_INTERVAL_MINUTES`: defaults to `60`
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("DRONE_API_URL").map_err(|_| {
            EtlError::Config("DRONE_API_URL environment variable is not set".to_string())
        })?;

        let config = Self {
            api_url,
            service_type: env::var("SERVICE_TYPE")
                .unwrap_or_else(|_| DEFAULT_SERVICE_TYPE.to_string()),
            vendor: env::var("VENDOR").unwrap_or_else(|_| DEFAULT_VENDOR.to_string()),
            interval_minutes: env::var("ETL_INTERVAL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_INTERVAL_MINUTES),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(EtlError::Config("DRONE_API_URL cannot be empty".to_string()));
        }
        if reqwest::Url::parse(&self.api_url).is_err() {
            return Err(EtlError::Config(format!(
                "DRONE_API_URL is not a valid URL: {}",
                self.api_url
            )));
        }
        if self.interval_minutes == 0 {
            return Err(EtlError::Config(
                "ETL_INTERVAL_MINUTES must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in ["DRONE_API_URL", "SERVICE_TYPE", "VENDOR", "ETL_INTERVAL_MINUTES"] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_missing_api_url_is_fatal() {
        clear_env();
        let err = EtlConfig::from_env().unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
        assert!(err.to_string().contains("DRONE_API_URL"));
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        std::env::set_var("DRONE_API_URL", "https://api.example.com/drone-traffic");

        let config = EtlConfig::from_env().unwrap();
        assert_eq!(config.service_type, DEFAULT_SERVICE_TYPE);
        assert_eq!(config.vendor, DEFAULT_VENDOR);
        assert_eq!(config.interval_minutes, DEFAULT_INTERVAL_MINUTES);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("DRONE_API_URL", "https://api.example.com/drone-traffic");
        std::env::set_var("SERVICE_TYPE", "airspace-survey");
        std::env::set_var("VENDOR", "droneX");
        std::env::set_var("ETL_INTERVAL_MINUTES", "5");

        let config = EtlConfig::from_env().unwrap();
        assert_eq!(config.service_type, "airspace-survey");
        assert_eq!(config.vendor, "droneX");
        assert_eq!(config.interval_minutes, 5);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = EtlConfig {
            api_url: "not a url".to_string(),
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            vendor: DEFAULT_VENDOR.to_string(),
            interval_minutes: 60,
        };
        assert!(config.validate().is_err());
    }
}
