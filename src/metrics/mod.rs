//! Metric records, their derivation from raw counters, and publication.

pub mod derivation;
pub mod publisher;
pub mod record;

pub use derivation::{derive_disk, derive_memory, VolumeFilter};
pub use publisher::{MetricPublisher, PublishOutcome};
pub use record::{MetricDatum, MetricRecord, Unit};
