//! Interfaces to the systems around the collector: where the SNMP password
//! lives, which hosts to poll, and where metrics are sent.

use async_trait::async_trait;
use serde::Serialize;

pub mod directory;
pub mod secret;
pub mod sink;

pub use directory::InventoryDirectory;
pub use secret::EnvSecretProvider;
pub use sink::{JsonLinesSink, LogSink};

use crate::collector::types::Target;
use crate::error::Result;
use crate::metrics::MetricDatum;

#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// # Errors
    ///
    /// [`crate::error::CollectorError::SecretUnavailable`] when the secret is
    /// missing or access is denied.
    async fn get_secret(&self, secret_id: &str) -> Result<String>;
}

#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Hosts carrying the `tag_key` tag.
    ///
    /// # Errors
    ///
    /// [`crate::error::CollectorError::DirectoryUnavailable`] on backend failure.
    async fn list_targets(&self, tag_key: &str) -> Result<Vec<Target>>;
}

#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// # Errors
    ///
    /// [`crate::error::CollectorError::PublishFailure`] when the datum is rejected.
    async fn put_metric(&self, datum: &MetricDatum) -> Result<SinkResponse>;
}

/// Acknowledgement returned by a sink for one datum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkResponse {
    pub request_id: String,
}
