use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{MetricsSink, SinkResponse};
use crate::error::{CollectorError, Result};
use crate::metrics::MetricDatum;

/// Emits every datum as a structured log event.
#[derive(Debug, Default)]
pub struct LogSink {
    sequence: AtomicU64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricsSink for LogSink {
    async fn put_metric(&self, datum: &MetricDatum) -> Result<SinkResponse> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            namespace = %datum.namespace,
            metric = %datum.metric_name,
            value = datum.value,
            unit = datum.unit.as_str(),
            dimension = %format!("{}={}", datum.dimension_name, datum.dimension_value),
            timestamp = %datum.timestamp.to_rfc3339(),
            "put metric"
        );
        Ok(SinkResponse {
            request_id: format!("log-{:08}", seq),
        })
    }
}

/// Appends every datum as one JSON document per line.
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<Option<tokio::fs::File>>,
    sequence: AtomicU64,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
            sequence: AtomicU64::new(0),
        }
    }

    async fn append(&self, line: &[u8]) -> std::io::Result<()> {
        let mut guard = self.file.lock().await;
        if guard.is_none() {
            let file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line).await?;
            file.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsSink for JsonLinesSink {
    async fn put_metric(&self, datum: &MetricDatum) -> Result<SinkResponse> {
        let mut line = serde_json::to_vec(datum)
            .map_err(|e| CollectorError::PublishFailure(format!("cannot encode datum: {}", e)))?;
        line.push(b'\n');

        self.append(&line)
            .await
            .map_err(|e| CollectorError::PublishFailure(format!("{}: {}", self.path.display(), e)))?;

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(SinkResponse {
            request_id: format!("jsonl-{:08}", seq),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Unit;
    use chrono::TimeZone;

    fn datum(name: &str, value: f64) -> MetricDatum {
        MetricDatum {
            namespace: "SNMP/Volume".to_string(),
            metric_name: name.to_string(),
            value,
            unit: Unit::Percent,
            dimension_name: "VolumeId".to_string(),
            dimension_value: "i-1:/opt".to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn log_sink_numbers_requests() {
        let sink = LogSink::new();
        let first = sink.put_metric(&datum("VolumeUtilisation", 1.0)).await.unwrap();
        let second = sink.put_metric(&datum("VolumeUtilisation", 2.0)).await.unwrap();
        assert_eq!(first.request_id, "log-00000001");
        assert_eq!(second.request_id, "log-00000002");
    }

    #[tokio::test]
    async fn json_lines_sink_appends_one_line_per_datum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let sink = JsonLinesSink::new(&path);

        sink.put_metric(&datum("VolumeSize", 100.0)).await.unwrap();
        sink.put_metric(&datum("VolumeUtilisation", 50.0)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["metric_name"], "VolumeSize");
        assert_eq!(lines[1]["dimension_value"], "i-1:/opt");
        assert_eq!(lines[1]["unit"], "Percent");
        assert_eq!(lines[1]["timestamp"], "2026-10-18T12:00:00Z");
    }

    #[tokio::test]
    async fn unwritable_path_is_publish_failure() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonLinesSink::new(dir.path().join("missing").join("metrics.jsonl"));

        let err = sink.put_metric(&datum("VolumeSize", 1.0)).await.unwrap_err();

        assert_eq!(err.kind(), "PublishFailure");
    }
}
