//! Payload normalization into column-uniform record batches
//!
//! The external source returns schema-less JSON. Downstream storage wants
//! uniform records, so the transformer unions the keys seen across all
//! records and fills the gaps with explicit nulls (schema-on-read), then
//! stamps every record with the run's single processing timestamp.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Field name carrying the run's processing timestamp.
pub const PROCESSED_AT_FIELD: &str = "processed_at";

/// An ordered batch of uniform records produced by one pipeline run.
///
/// Invariants: a batch is never empty (`transform` returns `None` instead),
/// every record has exactly the keys in `columns`, and every record carries
/// the identical `processed_at` stamp.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    /// Unioned column set, sorted, including `processed_at`.
    pub columns: Vec<String>,
    /// One map per source record, with explicit nulls for absent fields.
    pub records: Vec<Map<String, Value>>,
    /// Processing timestamp, captured once per run.
    pub processed_at: DateTime<Utc>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the batch as a single JSON array document.
    pub fn to_document(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.records)
    }
}

/// Normalize a raw payload into a uniform batch.
///
/// Returns `None` for an absent payload (extraction failed upstream) or
/// one that holds no records; both are normal no-data outcomes, not
/// errors. The timestamp is injected by the caller so the function stays
/// deterministic under test.
pub fn transform(payload: Option<Value>, processed_at: DateTime<Utc>) -> Option<RecordBatch> {
    let raw = match payload {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(
                payload_type = value_type(&other),
                "Payload is not a JSON array, treating as no data"
            );
            return None;
        },
        None => return None,
    };

    let mut records: Vec<Map<String, Value>> = Vec::with_capacity(raw.len());
    for item in raw {
        match item {
            Value::Object(map) => records.push(map),
            other => {
                warn!(
                    element_type = value_type(&other),
                    "Skipping non-object payload element"
                );
            },
        }
    }

    if records.is_empty() {
        return None;
    }

    // Stamp first so the timestamp participates in the column union.
    let stamp = Value::String(processed_at.to_rfc3339());
    for record in &mut records {
        record.insert(PROCESSED_AT_FIELD.to_string(), stamp.clone());
    }

    let columns: BTreeSet<String> = records
        .iter()
        .flat_map(|r| r.keys().cloned())
        .collect();

    for record in &mut records {
        for column in &columns {
            record.entry(column.clone()).or_insert(Value::Null);
        }
    }

    debug!(
        records = records.len(),
        columns = columns.len(),
        "Transformed payload into uniform batch"
    );

    Some(RecordBatch {
        columns: columns.into_iter().collect(),
        records,
        processed_at,
    })
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn frozen_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_none_payload_yields_no_batch() {
        assert!(transform(None, frozen_clock()).is_none());
    }

    #[test]
    fn test_empty_array_yields_no_batch() {
        assert!(transform(Some(json!([])), frozen_clock()).is_none());
    }

    #[test]
    fn test_non_array_payload_yields_no_batch() {
        assert!(transform(Some(json!({"id": 1})), frozen_clock()).is_none());
    }

    #[test]
    fn test_column_union_fills_missing_fields_with_null() {
        let payload = json!([
            {"id": 1, "lat": 10.0},
            {"id": 2, "lat": 11.0, "alt": 50}
        ]);

        let batch = transform(Some(payload), frozen_clock()).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.columns,
            vec!["alt", "id", "lat", PROCESSED_AT_FIELD]
        );
        assert_eq!(batch.records[0]["alt"], Value::Null);
        assert_eq!(batch.records[1]["alt"], json!(50));
    }

    #[test]
    fn test_every_record_carries_identical_processed_at() {
        let payload = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let ts = frozen_clock();

        let batch = transform(Some(payload), ts).unwrap();

        let expected = Value::String(ts.to_rfc3339());
        for record in &batch.records {
            assert_eq!(record[PROCESSED_AT_FIELD], expected);
        }
        assert_eq!(batch.processed_at, ts);
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let payload = json!([{"id": 1}, 42, "junk", {"id": 2}]);

        let batch = transform(Some(payload), frozen_clock()).unwrap();

        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_all_non_object_elements_yield_no_batch() {
        let payload = json!([1, 2, 3]);

        assert!(transform(Some(payload), frozen_clock()).is_none());
    }

    #[test]
    fn test_batch_document_is_a_json_array() {
        let payload = json!([{"id": 1}]);
        let batch = transform(Some(payload), frozen_clock()).unwrap();

        let document: Value = serde_json::from_slice(&batch.to_document().unwrap()).unwrap();
        assert!(document.is_array());
        assert_eq!(document.as_array().unwrap().len(), 1);
    }
}
