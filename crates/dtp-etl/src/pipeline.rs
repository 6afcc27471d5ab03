//! Pipeline run sequencing
//!
//! One run walks Extract -> Transform -> Load. Extraction failure is not
//! fatal: the run degrades to a no-op load. The two load targets are
//! independent; each failure is caught, logged, and reported as a per-sink
//! boolean. Nothing escapes `run`, so a bad run never takes the scheduler
//! down with it.

use chrono::Utc;
use dtp_common::storage::Storage;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::EtlConfig;
use crate::error::Result;
use crate::extract::Extractor;
use crate::sink::{ObjectSink, RelationalSink};
use crate::transform::transform;

/// Per-stage outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Correlation id, stamped on every log line of the run.
    pub run_id: Uuid,
    /// Whether extraction produced a payload.
    pub extracted: bool,
    /// Records in the transformed batch (0 when the run degraded to no-op).
    pub records: usize,
    /// Whether the object store gained an archive this run.
    pub object_store: bool,
    /// Whether the relational load committed this run.
    pub relational: bool,
}

/// Sequences the ETL stages over long-lived, injected dependencies.
///
/// The extractor client, object store client, and connection pool are
/// created once at startup and reused across runs; the scheduler
/// serializes runs, so they are never used concurrently.
pub struct PipelineRunner {
    extractor: Extractor,
    object_sink: ObjectSink,
    relational_sink: RelationalSink,
    service_type: String,
    vendor: String,
}

impl PipelineRunner {
    pub fn new(config: &EtlConfig, storage: Storage, pool: PgPool) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(&config.api_url)?,
            object_sink: ObjectSink::new(storage),
            relational_sink: RelationalSink::new(pool),
            service_type: config.service_type.clone(),
            vendor: config.vendor.clone(),
        })
    }

    /// Execute one full pipeline run and report per-stage outcomes.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();

        info!(
            %run_id,
            service_type = %self.service_type,
            vendor = %self.vendor,
            "Starting ETL run"
        );

        // Extract. Failure degrades the run instead of aborting it.
        let payload = match self.extractor.extract().await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(%run_id, error = %e, "Extraction failed, continuing with empty payload");
                None
            },
        };
        let extracted = payload.is_some();

        // Transform. The timestamp is captured once here so every record
        // of the run carries the same stamp.
        let processed_at = Utc::now();
        let batch = transform(payload, processed_at);
        let records = batch.as_ref().map_or(0, |b| b.len());

        // Load. The sinks are unordered and independent; each failure is
        // a run-level warning, not a run abortion.
        let object_store = match self
            .object_sink
            .store(batch.as_ref(), &self.service_type, &self.vendor)
            .await
        {
            Ok(written) => written,
            Err(e) => {
                error!(%run_id, error = %e, "Object store load failed");
                false
            },
        };

        let relational = match self.relational_sink.store(batch.as_ref()).await {
            Ok(written) => written,
            Err(e) => {
                error!(%run_id, error = %e, "Relational load failed");
                false
            },
        };

        let report = RunReport {
            run_id,
            extracted,
            records,
            object_store,
            relational,
        };

        info!(
            %run_id,
            extracted = report.extracted,
            records = report.records,
            object_store = report.object_store,
            relational = report.relational,
            "ETL run completed"
        );

        report
    }
}
