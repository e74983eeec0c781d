//! # vcloud-client -- Ensure-or-create client for Vagrant Cloud
//!
//! Prepares a Vagrant Cloud box for an artifact upload. A [`BoxSession`]
//! makes sure that, in order,
//!
//! 1. the box `username/name` exists,
//! 2. a named version exists under it,
//! 3. a provider/architecture pair exists under that version,
//!
//! creating whatever is missing, and then asks Vagrant Cloud for the
//! pre-signed URL the local `.box` file should be sent to. Sending the file
//! is left to a separate uploader.
//!
//! ## Architecture
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`endpoints`] | URLs and JSON bodies, no I/O |
//! | [`http`] | one authenticated request, status left to the caller |
//! | [`probe`] | `GET`-based existence checks, soft or hard |
//! | [`session`] | the four-stage chain and its preconditions |
//!
//! Every call takes a [`CallContext`]; cancelling it aborts the stage in
//! progress. Nothing is retried.

pub mod config;
pub mod context;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod identity;
pub mod probe;
pub mod session;
pub mod token;

pub use config::VagrantCloudConfig;
pub use context::CallContext;
pub use endpoints::UploadTarget;
pub use error::{ErrorKind, VagrantCloudError};
pub use http::ResponseSnapshot;
pub use identity::{BoxIdentity, ProviderTarget};
pub use session::{BoxSession, ChainState, Stage};

/// Top-level Vagrant Cloud client. Owns the shared HTTP connection pool
/// and hands out sessions that use it.
#[derive(Debug, Clone)]
pub struct VagrantCloudClient {
    api: http::ApiClient,
}

impl VagrantCloudClient {
    /// Create a new client from configuration.
    pub fn new(config: VagrantCloudConfig) -> Result<Self, VagrantCloudError> {
        Ok(Self {
            api: http::ApiClient::new(&config)?,
        })
    }

    /// Start a new pipeline invocation. Sessions share this client's
    /// connection pool but nothing else.
    pub fn session(&self) -> BoxSession {
        BoxSession::new(self.api.clone())
    }

    /// The endpoint formatter, for drivers that want to log target URLs.
    pub fn endpoints(&self) -> &endpoints::Endpoints {
        self.api.endpoints()
    }
}
