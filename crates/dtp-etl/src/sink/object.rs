//! Object store sink: one JSON archive document per run

use chrono::{DateTime, Utc};
use dtp_common::storage::Storage;
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::transform::RecordBatch;

/// Fixed bucket all archives land in.
pub const BUCKET: &str = "drone-data";

/// File name of the archive document inside its run folder.
const OBJECT_NAME: &str = "drone_traffic.json";

/// Compose the archive key for one run.
///
/// The timestamp is truncated to seconds, so two runs for the same
/// service/vendor within the same second target the same key and the later
/// one overwrites. Accepted limitation.
pub fn archive_key(service_type: &str, vendor: &str, processed_at: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}/{}",
        service_type,
        vendor,
        processed_at.format("%Y%m%d_%H%M%S"),
        OBJECT_NAME
    )
}

/// Writes a transformed batch into the object store as a single JSON array
/// document, keyed by service type, vendor, and run timestamp.
pub struct ObjectSink {
    storage: Storage,
}

impl ObjectSink {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Store one batch. Returns `Ok(false)` without touching the store
    /// when the batch is absent or empty; `Ok(true)` after a successful
    /// put.
    ///
    /// The put is a single atomic object write, so there is no partial
    /// state to clean up on failure.
    pub async fn store(
        &self,
        batch: Option<&RecordBatch>,
        service_type: &str,
        vendor: &str,
    ) -> Result<bool> {
        let Some(batch) = batch else {
            debug!("No batch to archive, skipping object store write");
            return Ok(false);
        };

        if batch.is_empty() {
            debug!("Empty batch, skipping object store write");
            return Ok(false);
        }

        self.storage
            .ensure_bucket(BUCKET)
            .await
            .map_err(|e| EtlError::StorageWrite(format!("{e:#}")))?;

        let document = batch.to_document()?;
        let key = archive_key(service_type, vendor, batch.processed_at);

        self.storage
            .upload(BUCKET, &key, document, Some("application/json".to_string()))
            .await
            .map_err(|e| EtlError::StorageWrite(format!("{e:#}")))?;

        info!(
            records = batch.len(),
            key = %key,
            "Archived batch to object store"
        );

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dtp_common::storage::config::StorageConfig;

    #[tokio::test]
    async fn test_absent_batch_is_a_no_op() {
        // Client construction is offline; the no-op path never sends a
        // request, so no endpoint needs to exist.
        let storage = Storage::new(StorageConfig::for_minio("http://127.0.0.1:9"));
        let sink = ObjectSink::new(storage);

        assert!(!sink
            .store(None, "traffic-monitoring", "drone-vendor")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let storage = Storage::new(StorageConfig::for_minio("http://127.0.0.1:9"));
        let sink = ObjectSink::new(storage);
        let batch = RecordBatch {
            columns: Vec::new(),
            records: Vec::new(),
            processed_at: Utc::now(),
        };

        // Must return before the bucket check; the endpoint is
        // unreachable, so any request would surface as an error.
        assert!(!sink
            .store(Some(&batch), "traffic-monitoring", "drone-vendor")
            .await
            .unwrap());
    }

    #[test]
    fn test_archive_key_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(
            archive_key("traffic-monitoring", "droneX", ts),
            "traffic-monitoring-droneX-20240102_030405/drone_traffic.json"
        );
    }

    #[test]
    fn test_archive_key_zero_pads_components() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 9).unwrap();

        assert_eq!(
            archive_key("traffic-monitoring", "drone-vendor", ts),
            "traffic-monitoring-drone-vendor-20251231_235909/drone_traffic.json"
        );
    }
}
