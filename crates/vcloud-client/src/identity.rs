//! The in-memory identity record a session builds up stage by stage.

use vcloud_core::{Architecture, BoxName, BoxVersion, ProviderName, Username};

/// Provider and architecture are always set together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTarget {
    pub provider: ProviderName,
    pub architecture: Architecture,
}

/// Which box, version and provider a session is working on.
///
/// `version` is populated by `with_version`, `provider` by
/// `with_provider`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxIdentity {
    pub username: Username,
    pub name: BoxName,
    pub version: Option<BoxVersion>,
    pub provider: Option<ProviderTarget>,
    /// Sent as `is_private` when the box is created. Always false today.
    pub private: bool,
}

impl BoxIdentity {
    pub fn new(username: Username, name: BoxName) -> Self {
        Self {
            username,
            name,
            version: None,
            provider: None,
            private: false,
        }
    }

    /// `username/name`, the form Vagrant itself prints.
    pub fn tag(&self) -> String {
        format!("{}/{}", self.username, self.name)
    }
}
