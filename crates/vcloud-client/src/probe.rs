//! Existence probes.
//!
//! Each probe is one `GET` whose outcome is folded into a three-valued
//! [`Probe`]. Callers decide how strict to be:
//!
//! - [`Probe::soft`] is used on the entity a stage is about to create.
//!   Anything but 200 counts as absent, and transport failures are
//!   downgraded to absent too, so a 5xx or a dropped connection leads to
//!   a create attempt rather than an error. Both cases are logged at
//!   `warn`. Cancellation is never downgraded.
//! - [`Probe::hard`] is used on predecessors that must already exist.
//!   A 404 is [`VagrantCloudError::RemoteAbsence`], any other non-200 is
//!   [`VagrantCloudError::RemoteFailure`], and transport failures propagate.

use reqwest::StatusCode;
use serde::Serialize;
use vcloud_core::BoxVersion;

use crate::context::CallContext;
use crate::endpoints::Endpoint;
use crate::error::VagrantCloudError;
use crate::http::{ApiClient, ApiResponse, ResponseSnapshot};
use crate::identity::{BoxIdentity, ProviderTarget};
use crate::token::BearerToken;

/// The remote entities the chain ensures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Box,
    Version,
    Provider,
}

impl Entity {
    /// Stage sequence that creates this entity, for error hints.
    pub fn created_by(self) -> &'static str {
        match self {
            Self::Box => "create-box",
            Self::Version => "create-box with-version",
            Self::Provider => "create-box with-version with-provider",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Box => "box",
            Self::Version => "version",
            Self::Provider => "provider",
        })
    }
}

/// Outcome of one existence probe.
#[derive(Debug)]
pub enum Probe {
    /// 200.
    Present,
    /// Any other status, 404 included.
    Absent(StatusCode),
    /// No HTTP response at all.
    Transport(VagrantCloudError),
}

impl Probe {
    pub fn from_result(result: Result<ApiResponse, VagrantCloudError>) -> Self {
        match result {
            Ok(resp) if resp.is_ok() => Self::Present,
            Ok(resp) => Self::Absent(resp.status),
            Err(e) => Self::Transport(e),
        }
    }

    /// Present-or-not, swallowing everything except cancellation.
    pub fn soft(self, entity: Entity, endpoint: &Endpoint) -> Result<bool, VagrantCloudError> {
        match self {
            Self::Present => Ok(true),
            Self::Absent(status) if status == StatusCode::NOT_FOUND => {
                tracing::debug!(%entity, url = %endpoint.url, "{entity} not found");
                Ok(false)
            }
            Self::Absent(status) => {
                tracing::warn!(
                    %entity,
                    url = %endpoint.url,
                    status = status.as_u16(),
                    "existence probe got a non-404 failure; treating {entity} as absent"
                );
                Ok(false)
            }
            Self::Transport(e) if e.is_cancellation() => Err(e),
            Self::Transport(e) => {
                tracing::warn!(
                    %entity,
                    url = %endpoint.url,
                    error = %e,
                    "existence probe failed to reach Vagrant Cloud; treating {entity} as absent"
                );
                Ok(false)
            }
        }
    }

    /// Require presence. A 404 means missing; any other non-200 is a
    /// remote failure.
    pub fn hard(self, entity: Entity, endpoint: &Endpoint) -> Result<(), VagrantCloudError> {
        match self {
            Self::Present => Ok(()),
            Self::Absent(status) if status == StatusCode::NOT_FOUND => {
                Err(VagrantCloudError::RemoteAbsence {
                    entity,
                    url: endpoint.url.to_string(),
                    status,
                })
            }
            Self::Absent(status) => Err(VagrantCloudError::RemoteFailure {
                operation: endpoint.operation,
                url: endpoint.url.to_string(),
                status,
            }),
            Self::Transport(e) => Err(e),
        }
    }
}

/// One stage's view of the remote side: the shared client, the session's
/// token, and the slot every response snapshot is written to.
pub(crate) struct Remote<'s> {
    pub(crate) api: &'s ApiClient,
    pub(crate) token: &'s BearerToken,
    pub(crate) last_response: &'s mut Option<ResponseSnapshot>,
}

impl Remote<'_> {
    /// Send one request and record its snapshot, whatever the status. A
    /// call that got no HTTP response clears the slot.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &mut self,
        ctx: &CallContext,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<ApiResponse, VagrantCloudError> {
        let result = self.api.execute(ctx, self.token, endpoint, body).await;
        *self.last_response = result.as_ref().ok().map(|resp| resp.snapshot.clone());
        result
    }

    async fn probe(&mut self, ctx: &CallContext, endpoint: &Endpoint) -> Probe {
        Probe::from_result(self.send(ctx, endpoint, None::<&()>).await)
    }

    pub(crate) async fn box_exists(
        &mut self,
        ctx: &CallContext,
        identity: &BoxIdentity,
    ) -> (Probe, Endpoint) {
        let endpoint = self.api.endpoints().box_get(&identity.username, &identity.name);
        (self.probe(ctx, &endpoint).await, endpoint)
    }

    pub(crate) async fn version_exists(
        &mut self,
        ctx: &CallContext,
        identity: &BoxIdentity,
        version: &BoxVersion,
    ) -> (Probe, Endpoint) {
        let endpoint = self
            .api
            .endpoints()
            .version_get(&identity.username, &identity.name, version);
        (self.probe(ctx, &endpoint).await, endpoint)
    }

    pub(crate) async fn provider_exists(
        &mut self,
        ctx: &CallContext,
        identity: &BoxIdentity,
        version: &BoxVersion,
        target: &ProviderTarget,
    ) -> (Probe, Endpoint) {
        let endpoint = self.api.endpoints().provider_get(
            &identity.username,
            &identity.name,
            version,
            &target.provider,
            &target.architecture,
        );
        (self.probe(ctx, &endpoint).await, endpoint)
    }
}
