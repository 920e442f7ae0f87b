use crate::{metrics::MetricsSnapshot, preparer::PartitionDropOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Outcome of a successful run. Failed runs produce a `TransferError` instead.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub total_rows: u64,
    pub batches_written: u64,
    pub bytes_transferred: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_drop: Option<PartitionDropOutcome>,
}

impl TransferReport {
    pub(crate) fn new(
        snapshot: MetricsSnapshot,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            total_rows: snapshot.rows_transferred,
            batches_written: snapshot.batches_written,
            bytes_transferred: snapshot.bytes_transferred,
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: elapsed.as_millis() as u64,
            truncated: false,
            partition_drop: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let snapshot = MetricsSnapshot {
            rows_transferred: 250,
            bytes_transferred: 2000,
            batches_written: 3,
            failure_count: 0,
        };
        let mut report = TransferReport::new(snapshot, Utc::now(), Duration::from_millis(1500));
        report.partition_drop = Some(PartitionDropOutcome::NotFound);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["total_rows"], 250);
        assert_eq!(json["batches_written"], 3);
        assert_eq!(json["elapsed_ms"], 1500);
        assert_eq!(json["partition_drop"], "not_found");
        assert!(json["started_at"].is_string());
        assert_eq!(report.elapsed_secs(), 1.5);
    }
}
