use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::record::{DimensionKind, MetricDatum, MetricRecord};
use crate::error::{CollectorError, ErrorInfo};
use crate::providers::{MetricsSink, SinkResponse};

/// Result of sending one record, aligned with the input records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published {
        metric_name: String,
        dimension_value: String,
        response: SinkResponse,
    },
    Failed {
        metric_name: String,
        dimension_value: String,
        error: ErrorInfo,
    },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// Sends derived records to the sink, one call per record.
#[derive(Clone)]
pub struct MetricPublisher {
    sink: Arc<dyn MetricsSink>,
}

impl MetricPublisher {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    /// Dimension value for a record published on behalf of `target_id`.
    pub fn dimension_value(target_id: &str, record: &MetricRecord) -> String {
        match record.dimension() {
            DimensionKind::InstanceId => target_id.to_string(),
            DimensionKind::VolumeId => {
                let mut value = target_id.to_string();
                for part in record.key_parts() {
                    value.push(':');
                    value.push_str(part);
                }
                value
            }
        }
    }

    pub fn datum(target_id: &str, record: &MetricRecord, timestamp: DateTime<Utc>) -> MetricDatum {
        MetricDatum {
            namespace: record.namespace().to_string(),
            metric_name: record.metric_name().to_string(),
            value: record.value(),
            unit: record.unit(),
            dimension_name: record.dimension().name().to_string(),
            dimension_value: Self::dimension_value(target_id, record),
            timestamp,
        }
    }

    /// Publishes every record; a failed record does not stop the others.
    /// Once `cancel` fires, the remaining records are reported as cancelled.
    pub async fn publish(
        &self,
        target_id: &str,
        records: &[MetricRecord],
        timestamp: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Vec<PublishOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            let datum = Self::datum(target_id, record, timestamp);

            if cancel.is_cancelled() {
                outcomes.push(PublishOutcome::Failed {
                    metric_name: datum.metric_name,
                    dimension_value: datum.dimension_value,
                    error: CollectorError::Cancelled("publish".to_string()).to_info(),
                });
                continue;
            }

            let outcome = match self.sink.put_metric(&datum).await {
                Ok(response) => PublishOutcome::Published {
                    metric_name: datum.metric_name,
                    dimension_value: datum.dimension_value,
                    response,
                },
                Err(e) => {
                    let e = match e {
                        CollectorError::PublishFailure(_) => e,
                        other => CollectorError::PublishFailure(other.to_string()),
                    };
                    tracing::warn!(
                        target_id,
                        metric = %datum.metric_name,
                        error = %e,
                        "failed to publish metric"
                    );
                    PublishOutcome::Failed {
                        metric_name: datum.metric_name,
                        dimension_value: datum.dimension_value,
                        error: e.to_info(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
