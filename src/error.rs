use serde::Serialize;

/// Errors raised while collecting, deriving or publishing host telemetry.
///
/// Only [`CollectorError::SecretUnavailable`] and
/// [`CollectorError::DirectoryUnavailable`] abort a whole collection pass.
/// Every other kind is captured into the report next to the target, row or
/// record it belongs to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectorError {
    /// The secret provider denied or could not find the SNMP password.
    #[error("secret unavailable: {0}")]
    SecretUnavailable(String),

    /// The directory service could not list targets.
    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// No response, a timeout or an undecodable response from the agent.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The agent answered with a non-zero error status.
    #[error("{status} at {oid}")]
    ProtocolFailure { status: String, oid: String },

    /// Raw counters cannot produce a metric (missing value, zero total).
    #[error("invalid metric input: {0}")]
    InvalidMetricInput(String),

    /// The metrics sink rejected a single datum.
    #[error("publish failure: {0}")]
    PublishFailure(String),

    /// The pass was cancelled and the pipeline stopped at a checkpoint.
    #[error("cancelled before {0}")]
    Cancelled(String),
}

impl CollectorError {
    pub fn kind(&self) -> &'static str {
        match self {
            CollectorError::SecretUnavailable(_) => "SecretUnavailable",
            CollectorError::DirectoryUnavailable(_) => "DirectoryUnavailable",
            CollectorError::TransportFailure(_) => "TransportFailure",
            CollectorError::ProtocolFailure { .. } => "ProtocolFailure",
            CollectorError::InvalidMetricInput(_) => "InvalidMetricInput",
            CollectorError::PublishFailure(_) => "PublishFailure",
            CollectorError::Cancelled(_) => "Cancelled",
        }
    }

    /// Whether the error aborts the whole pass rather than one target.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CollectorError::SecretUnavailable(_) | CollectorError::DirectoryUnavailable(_)
        )
    }

    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable view of an error for the collection report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, CollectorError>;
