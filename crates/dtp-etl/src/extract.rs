//! Telemetry extraction from the external HTTP source

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;

/// Request timeout for the telemetry source.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for pulling raw telemetry payloads.
///
/// Issues a single GET per call; a non-2xx status or transport error fails
/// the extraction. Retry is the scheduler's concern (the next tick), not
/// this layer's.
pub struct Extractor {
    client: Client,
    api_url: String,
}

impl Extractor {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("dtp-etl/0.1")
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Pull one raw JSON payload from the source.
    pub async fn extract(&self) -> Result<Value> {
        debug!("Extracting telemetry from {}", self.api_url);

        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;

        info!(url = %self.api_url, "Extracted telemetry payload");

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_extract_returns_payload() {
        let server = MockServer::start().await;
        let body = json!([{"id": 1, "lat": 10.0}, {"id": 2, "lat": 11.0}]);

        Mock::given(method("GET"))
            .and(path("/drone-traffic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let extractor = Extractor::new(format!("{}/drone-traffic", server.uri())).unwrap();
        let payload = extractor.extract().await.unwrap();

        assert_eq!(payload, body);
    }

    #[tokio::test]
    async fn test_extract_fails_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/drone-traffic"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let extractor = Extractor::new(format!("{}/drone-traffic", server.uri())).unwrap();

        assert!(extractor.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_extract_fails_on_connection_error() {
        // Nothing is listening on this port.
        let extractor = Extractor::new("http://127.0.0.1:9/drone-traffic").unwrap();

        assert!(extractor.extract().await.is_err());
    }
}
