use anyhow::{anyhow, Context, Result};
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use tracing::{debug, info, instrument};

pub mod config;

/// Thin wrapper around the S3 client, speaking to MinIO or AWS depending on
/// configuration. Created once at startup and reused across runs; buckets
/// are passed per call because the ETL pipeline and the read API address
/// different ones.
#[derive(Clone)]
pub struct Storage {
    client: Client,
}

impl Storage {
    pub fn new(config: config::StorageConfig) -> Self {
        debug!("Initializing storage client with config: {:?}", config.endpoint);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "dtp-storage",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style)
            .behavior_version_latest();

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("Storage client initialized");

        Self { client }
    }

    /// Check whether a bucket exists.
    #[instrument(skip(self))]
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let e = e.into_service_error();
                if e.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow!("Failed to check bucket existence: {}", e))
                }
            },
        }
    }

    /// Ensure a bucket exists, creating it only if absent. The existence
    /// check short-circuits creation, so calling this repeatedly is safe.
    #[instrument(skip(self))]
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        if self.bucket_exists(bucket).await? {
            debug!("Bucket {} already exists", bucket);
            return Ok(());
        }

        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .context(format!("Failed to create bucket: {}", bucket))?;

        info!("Created bucket: {}", bucket);

        Ok(())
    }

    /// Upload a single object. The put is atomic: either the whole object
    /// lands or nothing does, so no partial-write cleanup is needed.
    #[instrument(skip(self, data))]
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<()> {
        let size = data.len() as i64;

        debug!("Uploading {} bytes to s3://{}/{}", size, bucket, key);

        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(size)
            .body(ByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request.send().await.context("Failed to upload to S3")?;

        info!("Successfully uploaded to s3://{}/{}", bucket, key);

        Ok(())
    }

    /// Download one object's bytes.
    #[instrument(skip(self))]
    pub async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!("Downloading from s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context(format!("Failed to download from S3: {}", key))?;

        let data = response
            .body
            .collect()
            .await
            .context("Failed to read S3 response body")?
            .into_bytes()
            .to_vec();

        debug!("Downloaded {} bytes from s3://{}/{}", data.len(), bucket, key);

        Ok(data)
    }

    /// List all bucket names visible to the configured credentials.
    #[instrument(skip(self))]
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .context("Failed to list buckets")?;

        let names = response
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(|n| n.to_string()))
            .collect();

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn storage_for(server: &MockServer) -> Storage {
        Storage::new(config::StorageConfig::for_minio(server.uri()))
    }

    #[tokio::test]
    async fn test_ensure_bucket_skips_creation_when_bucket_exists() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/drone-data/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        // An existing bucket must never trigger CreateBucket.
        Mock::given(method("PUT"))
            .and(path("/drone-data/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let storage = storage_for(&server);
        storage.ensure_bucket("drone-data").await.unwrap();

        server.verify().await;
    }

    #[tokio::test]
    async fn test_ensure_bucket_creates_missing_bucket() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/drone-data/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/drone-data/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let storage = storage_for(&server);
        storage.ensure_bucket("drone-data").await.unwrap();

        server.verify().await;
    }

    #[tokio::test]
    async fn test_bucket_exists_maps_404_to_false() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/missing/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let storage = storage_for(&server);
        assert!(!storage.bucket_exists("missing").await.unwrap());
    }
}
