use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Kilobytes,
    Percent,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kilobytes => "Kilobytes",
            Unit::Percent => "Percent",
        }
    }
}

/// Which dimension a record is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DimensionKind {
    /// Value is the target id.
    InstanceId,
    /// Value is the target id joined with the volume path.
    VolumeId,
}

impl DimensionKind {
    pub fn name(self) -> &'static str {
        match self {
            DimensionKind::InstanceId => "InstanceId",
            DimensionKind::VolumeId => "VolumeId",
        }
    }
}

/// One derived metric, not yet bound to a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    namespace: &'static str,
    metric_name: &'static str,
    unit: Unit,
    value: f64,
    dimension: DimensionKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    key_parts: Vec<String>,
}

impl MetricRecord {
    pub(crate) fn instance(namespace: &'static str, metric_name: &'static str, unit: Unit, value: f64) -> Self {
        Self {
            namespace,
            metric_name,
            unit,
            value,
            dimension: DimensionKind::InstanceId,
            key_parts: Vec::new(),
        }
    }

    pub(crate) fn volume(
        namespace: &'static str,
        metric_name: &'static str,
        unit: Unit,
        value: f64,
        path: &str,
    ) -> Self {
        Self {
            namespace,
            metric_name,
            unit,
            value,
            dimension: DimensionKind::VolumeId,
            key_parts: vec![path.to_string()],
        }
    }

    pub fn namespace(&self) -> &str {
        self.namespace
    }

    pub fn metric_name(&self) -> &str {
        self.metric_name
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn dimension(&self) -> DimensionKind {
        self.dimension
    }

    pub fn key_parts(&self) -> &[String] {
        &self.key_parts
    }
}

/// What the metrics sink receives for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDatum {
    pub namespace: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: Unit,
    pub dimension_name: String,
    pub dimension_value: String,
    pub timestamp: DateTime<Utc>,
}
