//! # Ensure-or-Create Chain
//!
//! A [`BoxSession`] walks the four stages against Vagrant Cloud:
//!
//! ```text
//! Init ─create_box()──▶ BoxReady ─with_version()──▶ VersionReady ─with_provider()──▶ ProviderReady
//!                                                                                         │
//!                                                                                     upload()
//!                                                                                         │
//!                                                                                         ▼
//!                                                                                  upload_path URL
//! ```
//!
//! Each stage probes for its entity and creates it only when absent, so
//! running a stage twice with the same identity issues no second `POST`.
//! Predecessors are re-confirmed remotely on every later stage.
//!
//! A stage works on a copy of the identity and commits it together with
//! the new state only once every call has succeeded. A failed stage leaves
//! identity, token and state exactly as they were; only the debug snapshot
//! of the last response moves.

use serde::Serialize;
use vcloud_core::{Architecture, BoxName, BoxVersion, ProviderName, Username};

use crate::context::CallContext;
use crate::endpoints::{
    CreateBoxRequest, CreateProviderRequest, CreateVersionRequest, Endpoint, UploadTarget,
};
use crate::error::VagrantCloudError;
use crate::http::{ApiClient, ResponseSnapshot};
use crate::identity::{BoxIdentity, ProviderTarget};
use crate::probe::{Entity, Remote};
use crate::token::BearerToken;

// -- Stages and states -------------------------------------------------------

/// The four stage operations, named as the pipeline driver exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CreateBox,
    WithVersion,
    WithProvider,
    Upload,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateBox => "create-box",
            Self::WithVersion => "with-version",
            Self::WithProvider => "with-provider",
            Self::Upload => "upload",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far the chain has confirmed remote entities.
///
/// Ordered: `Init < BoxReady < VersionReady < ProviderReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainState {
    Init,
    BoxReady,
    VersionReady,
    ProviderReady,
}

// -- Session -----------------------------------------------------------------

/// One pipeline invocation's worth of state.
///
/// Not meant for concurrent use; every stage takes `&mut self`. Stage
/// methods return the session again so they can be chained:
///
/// ```no_run
/// # async fn demo(client: vcloud_client::VagrantCloudClient) -> Result<(), vcloud_client::VagrantCloudError> {
/// let ctx = vcloud_client::CallContext::new();
/// let mut session = client.session();
/// let target = session
///     .create_box(&ctx, "acme", "web", "token")
///     .await?
///     .with_version(&ctx, "1.0.0")
///     .await?
///     .with_provider(&ctx, "virtualbox", "amd64")
///     .await?
///     .upload(&ctx)
///     .await?;
/// println!("{}", target.upload_path);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BoxSession {
    api: ApiClient,
    token: Option<BearerToken>,
    identity: Option<BoxIdentity>,
    state: ChainState,
    last_response: Option<ResponseSnapshot>,
}

impl BoxSession {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            api,
            token: None,
            identity: None,
            state: ChainState::Init,
            last_response: None,
        }
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn identity(&self) -> Option<&BoxIdentity> {
        self.identity.as_ref()
    }

    /// Summary of the most recent call's HTTP response, successful or not.
    /// `None` if that call failed before a response arrived.
    pub fn last_response(&self) -> Option<&ResponseSnapshot> {
        self.last_response.as_ref()
    }

    /// String form of [`last_response`](Self::last_response); empty before
    /// the first call and after a call that got no HTTP response.
    pub fn debug(&self) -> String {
        self.last_response
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Stage 1: ensure `username/name` exists, creating it if needed.
    ///
    /// Stores `token` for the rest of the session. Calling this again
    /// starts over with the new identity and token.
    pub async fn create_box(
        &mut self,
        ctx: &CallContext,
        username: &str,
        name: &str,
        token: &str,
    ) -> Result<&mut Self, VagrantCloudError> {
        let identity = BoxIdentity::new(Username::new(username)?, BoxName::new(name)?);
        let token = BearerToken::new(token)?;
        ctx.ensure_active(Stage::CreateBox.as_str())?;

        let mut remote = Remote {
            api: &self.api,
            token: &token,
            last_response: &mut self.last_response,
        };

        let (probe, get) = remote.box_exists(ctx, &identity).await;
        let created = if probe.soft(Entity::Box, &get)? {
            false
        } else {
            let endpoint = self.api.endpoints().box_create();
            let body = CreateBoxRequest::new(&identity.username, &identity.name, identity.private);
            create(&mut remote, ctx, &endpoint, &body).await?;
            true
        };

        tracing::info!(
            stage = %Stage::CreateBox,
            vagrant_box = %identity.tag(),
            created,
            "box ready"
        );
        self.token = Some(token);
        self.identity = Some(identity);
        self.state = ChainState::BoxReady;
        Ok(self)
    }

    /// Stage 2: ensure `version` exists under the box, creating it if needed.
    ///
    /// Any provider chosen for a previous version is forgotten.
    pub async fn with_version(
        &mut self,
        ctx: &CallContext,
        version: &str,
    ) -> Result<&mut Self, VagrantCloudError> {
        let version = BoxVersion::new(version)?;
        let (token, mut identity) = self.require_box(Stage::WithVersion)?;
        ctx.ensure_active(Stage::WithVersion.as_str())?;
        identity.version = Some(version.clone());
        identity.provider = None;

        let mut remote = Remote {
            api: &self.api,
            token: &token,
            last_response: &mut self.last_response,
        };

        let (probe, get) = remote.box_exists(ctx, &identity).await;
        probe.hard(Entity::Box, &get)?;

        let (probe, get) = remote.version_exists(ctx, &identity, &version).await;
        let created = if probe.soft(Entity::Version, &get)? {
            false
        } else {
            let endpoint = self
                .api
                .endpoints()
                .version_create(&identity.username, &identity.name);
            create(&mut remote, ctx, &endpoint, &CreateVersionRequest::new(&version)).await?;
            true
        };

        tracing::info!(
            stage = %Stage::WithVersion,
            vagrant_box = %identity.tag(),
            version = %version,
            created,
            "version ready"
        );
        self.identity = Some(identity);
        self.state = ChainState::VersionReady;
        Ok(self)
    }

    /// Stage 3: ensure the provider/architecture pair exists under the
    /// current version, creating it if needed.
    pub async fn with_provider(
        &mut self,
        ctx: &CallContext,
        provider: &str,
        architecture: &str,
    ) -> Result<&mut Self, VagrantCloudError> {
        let target = ProviderTarget {
            provider: ProviderName::new(provider)?,
            architecture: Architecture::new(architecture)?,
        };
        let (token, mut identity) = self.require_box(Stage::WithProvider)?;
        let version = identity
            .version
            .clone()
            .ok_or(VagrantCloudError::Precondition {
                stage: Stage::WithProvider,
                missing: Stage::WithVersion,
            })?;
        ctx.ensure_active(Stage::WithProvider.as_str())?;
        identity.provider = Some(target.clone());

        let mut remote = Remote {
            api: &self.api,
            token: &token,
            last_response: &mut self.last_response,
        };

        let (probe, get) = remote.box_exists(ctx, &identity).await;
        probe.hard(Entity::Box, &get)?;
        let (probe, get) = remote.version_exists(ctx, &identity, &version).await;
        probe.hard(Entity::Version, &get)?;

        let (probe, get) = remote
            .provider_exists(ctx, &identity, &version, &target)
            .await;
        let created = if probe.soft(Entity::Provider, &get)? {
            false
        } else {
            let endpoint = self.api.endpoints().provider_create(
                &identity.username,
                &identity.name,
                &version,
            );
            let body = CreateProviderRequest::new(&target.provider, &target.architecture);
            create(&mut remote, ctx, &endpoint, &body).await?;
            true
        };

        tracing::info!(
            stage = %Stage::WithProvider,
            vagrant_box = %identity.tag(),
            version = %version,
            provider = %target.provider,
            architecture = %target.architecture,
            created,
            "provider ready"
        );
        self.identity = Some(identity);
        self.state = ChainState::ProviderReady;
        Ok(self)
    }

    /// Stage 4: fetch the pre-signed URL the box artifact is uploaded to.
    ///
    /// Does not change the session state.
    pub async fn upload(&mut self, ctx: &CallContext) -> Result<UploadTarget, VagrantCloudError> {
        let (token, identity) = self.require_box(Stage::Upload)?;
        let version = identity
            .version
            .as_ref()
            .ok_or(VagrantCloudError::Precondition {
                stage: Stage::Upload,
                missing: Stage::WithVersion,
            })?;
        let target = identity
            .provider
            .as_ref()
            .ok_or(VagrantCloudError::Precondition {
                stage: Stage::Upload,
                missing: Stage::WithProvider,
            })?;
        ctx.ensure_active(Stage::Upload.as_str())?;

        let mut remote = Remote {
            api: &self.api,
            token: &token,
            last_response: &mut self.last_response,
        };

        let (probe, get) = remote.box_exists(ctx, &identity).await;
        probe.hard(Entity::Box, &get)?;

        let endpoint = self.api.endpoints().upload_get(
            &identity.username,
            &identity.name,
            version,
            &target.provider,
            &target.architecture,
        );
        let resp = remote
            .send(ctx, &endpoint, None::<&()>)
            .await?
            .ensure_ok()?;
        let upload: UploadTarget =
            serde_json::from_slice(&resp.body).map_err(|source| VagrantCloudError::Decode {
                url: endpoint.url.to_string(),
                source,
            })?;

        tracing::info!(
            stage = %Stage::Upload,
            vagrant_box = %identity.tag(),
            version = %version,
            provider = %target.provider,
            architecture = %target.architecture,
            "upload URL issued"
        );
        Ok(upload)
    }

    /// Token and a working copy of the identity, or a precondition error
    /// if `create_box` has not succeeded yet.
    fn require_box(&self, stage: Stage) -> Result<(BearerToken, BoxIdentity), VagrantCloudError> {
        match (&self.token, &self.identity) {
            (Some(token), Some(identity)) if self.state >= ChainState::BoxReady => {
                Ok((token.clone(), identity.clone()))
            }
            _ => Err(VagrantCloudError::Precondition {
                stage,
                missing: Stage::CreateBox,
            }),
        }
    }
}

/// POST a create body and require 200. The response body is not inspected.
async fn create<B: Serialize>(
    remote: &mut Remote<'_>,
    ctx: &CallContext,
    endpoint: &Endpoint,
    body: &B,
) -> Result<(), VagrantCloudError> {
    remote.send(ctx, endpoint, Some(body)).await?.ensure_ok()?;
    tracing::info!(operation = %endpoint.operation, url = %endpoint.url, "created");
    Ok(())
}
