//! Vagrant Cloud client error types.

use reqwest::StatusCode;
use vcloud_core::ValidationError;

use crate::config::ConfigError;
use crate::endpoints::Operation;
use crate::probe::Entity;
use crate::session::Stage;

/// Errors from the ensure-or-create chain and the calls underneath it.
#[derive(Debug, thiserror::Error)]
pub enum VagrantCloudError {
    /// A stage was invoked before the stage it depends on.
    #[error("{stage} needs to be called after {missing}")]
    Precondition { stage: Stage, missing: Stage },

    /// A predecessor entity that must already exist was not found remotely.
    #[error("no existing {entity} found at {url} ({status}), create one with {}", entity.created_by())]
    RemoteAbsence {
        entity: Entity,
        url: String,
        status: StatusCode,
    },

    /// Vagrant Cloud answered with something other than 200.
    #[error("got a failing response for {url}: {status}")]
    RemoteFailure {
        operation: Operation,
        url: String,
        status: StatusCode,
    },

    /// Connection, DNS, TLS or timeout failure.
    #[error("HTTP error calling {operation} {url}: {source}")]
    Transport {
        operation: Operation,
        url: String,
        source: reqwest::Error,
    },

    /// The caller's context was cancelled.
    #[error("{what} cancelled")]
    Cancelled { what: String },

    /// The caller's deadline elapsed.
    #[error("{what} exceeded its deadline")]
    DeadlineExceeded { what: String },

    /// The upload response was not the expected JSON document.
    #[error("failed to decode upload response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// An identity fragment failed validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The bearer token is unusable. Never carries the token itself.
    #[error("invalid token: {reason}")]
    InvalidToken { reason: &'static str },

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse error categories, for drivers that branch on the kind of failure
/// rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Stage invoked out of order.
    Precondition,
    /// Required remote predecessor missing.
    RemoteAbsence,
    /// Non-200 from a probe, create or upload request.
    RemoteFailure,
    /// Connectivity failure, cancellation or deadline.
    Transport,
    /// Upload response body unusable.
    Decode,
    /// Rejected before any request: bad identity, token or configuration.
    InvalidInput,
}

impl VagrantCloudError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Precondition { .. } => ErrorKind::Precondition,
            Self::RemoteAbsence { .. } => ErrorKind::RemoteAbsence,
            Self::RemoteFailure { .. } => ErrorKind::RemoteFailure,
            Self::Transport { .. } | Self::Cancelled { .. } | Self::DeadlineExceeded { .. } => {
                ErrorKind::Transport
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Validation(_) | Self::InvalidToken { .. } | Self::Config(_) => {
                ErrorKind::InvalidInput
            }
        }
    }

    /// Whether this error came from the caller's context rather than the network.
    /// Such errors are never downgraded to "absent" by a soft probe.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::DeadlineExceeded { .. })
    }
}
