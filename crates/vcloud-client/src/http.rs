//! Authenticated HTTP caller.
//!
//! Issues exactly one request per call. Every request carries
//! `Content-Type: application/json` and `Authorization: Bearer <token>`.
//! Any HTTP status comes back as an [`ApiResponse`]; only transport
//! failures and cancellation are errors at this layer. No retries: a
//! failed call is reported to the stage that made it.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::config::{ConfigError, VagrantCloudConfig};
use crate::context::CallContext;
use crate::endpoints::{Endpoint, Endpoints, Operation};
use crate::error::VagrantCloudError;
use crate::token::BearerToken;

/// Summary of one HTTP exchange, kept for operator debugging.
///
/// Holds no body and no headers, so it can never leak the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub operation: Operation,
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub elapsed: Duration,
}

impl std::fmt::Display for ResponseSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} -> {} in {}ms",
            self.operation,
            self.method,
            self.url,
            self.status,
            self.elapsed.as_millis()
        )
    }
}

/// A response of any status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub snapshot: ResponseSnapshot,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Turn anything other than 200 into [`VagrantCloudError::RemoteFailure`].
    pub fn ensure_ok(self) -> Result<Self, VagrantCloudError> {
        if self.is_ok() {
            return Ok(self);
        }
        Err(VagrantCloudError::RemoteFailure {
            operation: self.snapshot.operation,
            url: self.snapshot.url,
            status: self.status,
        })
    }
}

/// Shared HTTP client plus the endpoint formatter.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Build the shared client from configuration.
    pub fn new(config: &VagrantCloudConfig) -> Result<Self, VagrantCloudError> {
        let endpoints = Endpoints::new(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::ClientBuild(e.to_string()))?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Issue one request and read the full body, racing the caller's context.
    /// `body`, when given, is sent as JSON.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        token: &BearerToken,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<ApiResponse, VagrantCloudError> {
        let operation = endpoint.operation;
        let method = endpoint.method();
        let url = endpoint.url.to_string();

        let mut request = self
            .http
            .request(method.clone(), endpoint.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(AUTHORIZATION, token.header_value()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |source: reqwest::Error| VagrantCloudError::Transport {
            operation,
            url: url.clone(),
            source,
        };

        let started = Instant::now();
        let (status, bytes) = ctx
            .run(operation.as_str(), async {
                let resp = request.send().await.map_err(&transport)?;
                let status = resp.status();
                let bytes = resp.bytes().await.map_err(&transport)?;
                Ok((status, bytes))
            })
            .await?;
        let elapsed = started.elapsed();

        tracing::debug!(
            operation = %operation,
            method = %method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Vagrant Cloud call completed"
        );

        Ok(ApiResponse {
            status,
            body: bytes.to_vec(),
            snapshot: ResponseSnapshot {
                operation,
                method,
                url,
                status,
                elapsed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: StatusCode) -> ResponseSnapshot {
        ResponseSnapshot {
            operation: Operation::BoxGet,
            method: Method::GET,
            url: "https://app.vagrantup.com/api/v2/box/acme/web".into(),
            status,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn snapshot_display_is_one_line_summary() {
        assert_eq!(
            snapshot(StatusCode::OK).to_string(),
            "box.get GET https://app.vagrantup.com/api/v2/box/acme/web -> 200 OK in 12ms"
        );
    }

    #[test]
    fn ensure_ok_passes_200() {
        let resp = ApiResponse {
            status: StatusCode::OK,
            body: Vec::new(),
            snapshot: snapshot(StatusCode::OK),
        };
        assert!(resp.ensure_ok().is_ok());
    }

    #[test]
    fn ensure_ok_rejects_other_2xx() {
        let resp = ApiResponse {
            status: StatusCode::CREATED,
            body: Vec::new(),
            snapshot: snapshot(StatusCode::CREATED),
        };
        match resp.ensure_ok() {
            Err(VagrantCloudError::RemoteFailure { status, url, .. }) => {
                assert_eq!(status, StatusCode::CREATED);
                assert!(url.ends_with("/box/acme/web"));
            }
            other => panic!("expected RemoteFailure, got: {other:?}"),
        }
    }

    #[test]
    fn client_rejects_bad_base_url() {
        let config = VagrantCloudConfig {
            base_url: "::not-a-url".into(),
            ..VagrantCloudConfig::default()
        };
        assert!(matches!(
            ApiClient::new(&config),
            Err(VagrantCloudError::Config(ConfigError::InvalidUrl(..)))
        ));
    }

    #[tokio::test]
    async fn closed_port_is_transport_error() {
        let config = VagrantCloudConfig::local_mock("http://127.0.0.1:1").unwrap();
        let client = ApiClient::new(&config).unwrap();
        let token = BearerToken::new("T").unwrap();
        let endpoint = client.endpoints().box_create();

        let err = client
            .execute(&CallContext::new(), &token, &endpoint, None::<&()>)
            .await
            .unwrap_err();
        assert!(matches!(err, VagrantCloudError::Transport { operation: Operation::BoxCreate, .. }));
        assert!(!err.to_string().contains("Bearer"));
    }
}
