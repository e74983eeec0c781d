//! Endpoint and request-body formatter for the Vagrant Cloud v2 API.
//!
//! Pure functions, no I/O. Identity fragments are appended as
//! percent-escaped path segments under the configured API root.
//!
//! ## Paths (relative to `https://app.vagrantup.com/api/v2`)
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | `box.get` | GET | `/box/{username}/{name}` |
//! | `box.create` | POST | `/boxes` |
//! | `version.get` | GET | `/box/{username}/{name}/version/{version}` |
//! | `version.create` | POST | `/box/{username}/{name}/versions` |
//! | `provider.get` | GET | `/box/{username}/{name}/version/{version}/provider/{provider}/{architecture}` |
//! | `provider.create` | POST | `/box/{username}/{name}/version/{version}/providers` |
//! | `upload.get` | GET | `/box/{username}/{name}/version/{version}/provider/{provider}/{architecture}/upload` |

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;
use vcloud_core::{Architecture, BoxName, BoxVersion, ProviderName, Username};

use crate::config::{parse_base_url, ConfigError};

// -- Operations ---------------------------------------------------------------

/// The seven calls the chain makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    BoxGet,
    BoxCreate,
    VersionGet,
    VersionCreate,
    ProviderGet,
    ProviderCreate,
    UploadGet,
}

impl Operation {
    /// HTTP method used by this operation.
    pub fn method(self) -> Method {
        match self {
            Self::BoxCreate | Self::VersionCreate | Self::ProviderCreate => Method::POST,
            Self::BoxGet | Self::VersionGet | Self::ProviderGet | Self::UploadGet => Method::GET,
        }
    }

    /// Stable dotted name used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BoxGet => "box.get",
            Self::BoxCreate => "box.create",
            Self::VersionGet => "version.get",
            Self::VersionCreate => "version.create",
            Self::ProviderGet => "provider.get",
            Self::ProviderCreate => "provider.create",
            Self::UploadGet => "upload.get",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formatted target: what to call and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub operation: Operation,
    pub url: Url,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        self.operation.method()
    }
}

// -- URL formatter ------------------------------------------------------------

/// Builds endpoint URLs under one API root.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` is not usable as an API root.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base: parse_base_url(base_url)?,
        })
    }

    /// The API root.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn build(&self, operation: Operation, segments: &[&str]) -> Endpoint {
        let mut url = self.base.clone();
        // `parse_base_url` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Endpoint { operation, url }
    }

    /// `GET /box/{username}/{name}`
    pub fn box_get(&self, username: &Username, name: &BoxName) -> Endpoint {
        self.build(
            Operation::BoxGet,
            &["box", username.as_str(), name.as_str()],
        )
    }

    /// `POST /boxes`
    pub fn box_create(&self) -> Endpoint {
        self.build(Operation::BoxCreate, &["boxes"])
    }

    /// `GET /box/{username}/{name}/version/{version}`
    pub fn version_get(&self, username: &Username, name: &BoxName, version: &BoxVersion) -> Endpoint {
        self.build(
            Operation::VersionGet,
            &["box", username.as_str(), name.as_str(), "version", version.as_str()],
        )
    }

    /// `POST /box/{username}/{name}/versions`
    pub fn version_create(&self, username: &Username, name: &BoxName) -> Endpoint {
        self.build(
            Operation::VersionCreate,
            &["box", username.as_str(), name.as_str(), "versions"],
        )
    }

    /// `GET /box/{username}/{name}/version/{version}/provider/{provider}/{architecture}`
    pub fn provider_get(
        &self,
        username: &Username,
        name: &BoxName,
        version: &BoxVersion,
        provider: &ProviderName,
        architecture: &Architecture,
    ) -> Endpoint {
        self.build(
            Operation::ProviderGet,
            &[
                "box",
                username.as_str(),
                name.as_str(),
                "version",
                version.as_str(),
                "provider",
                provider.as_str(),
                architecture.as_str(),
            ],
        )
    }

    /// `POST /box/{username}/{name}/version/{version}/providers`
    pub fn provider_create(
        &self,
        username: &Username,
        name: &BoxName,
        version: &BoxVersion,
    ) -> Endpoint {
        self.build(
            Operation::ProviderCreate,
            &[
                "box",
                username.as_str(),
                name.as_str(),
                "version",
                version.as_str(),
                "providers",
            ],
        )
    }

    /// `GET /box/{username}/{name}/version/{version}/provider/{provider}/{architecture}/upload`
    pub fn upload_get(
        &self,
        username: &Username,
        name: &BoxName,
        version: &BoxVersion,
        provider: &ProviderName,
        architecture: &Architecture,
    ) -> Endpoint {
        self.build(
            Operation::UploadGet,
            &[
                "box",
                username.as_str(),
                name.as_str(),
                "version",
                version.as_str(),
                "provider",
                provider.as_str(),
                architecture.as_str(),
                "upload",
            ],
        )
    }
}

// -- Request bodies -----------------------------------------------------------

/// Body of `POST /boxes`: `{"box":{"username":..,"name":..,"is_private":..}}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBoxRequest {
    #[serde(rename = "box")]
    pub new_box: NewBox,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBox {
    pub username: String,
    pub name: String,
    pub is_private: bool,
}

impl CreateBoxRequest {
    pub fn new(username: &Username, name: &BoxName, is_private: bool) -> Self {
        Self {
            new_box: NewBox {
                username: username.to_string(),
                name: name.to_string(),
                is_private,
            },
        }
    }
}

/// Body of `POST .../versions`: `{"version":{"version":..}}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateVersionRequest {
    pub version: NewVersion,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVersion {
    pub version: String,
}

impl CreateVersionRequest {
    pub fn new(version: &BoxVersion) -> Self {
        Self {
            version: NewVersion {
                version: version.to_string(),
            },
        }
    }
}

/// Body of `POST .../providers`: `{"provider":{"name":..,"architecture":..}}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProviderRequest {
    pub provider: NewProvider,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProvider {
    pub name: String,
    pub architecture: String,
}

impl CreateProviderRequest {
    pub fn new(provider: &ProviderName, architecture: &Architecture) -> Self {
        Self {
            provider: NewProvider {
                name: provider.to_string(),
                architecture: architecture.to_string(),
            },
        }
    }
}

// -- Response bodies ----------------------------------------------------------

/// Response of `upload.get`. Only `upload_path` is consumed; every other
/// field the API returns is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadTarget {
    /// Absolute URL the box artifact is sent to by the uploader.
    pub upload_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragments() -> (Username, BoxName, BoxVersion, ProviderName, Architecture) {
        (
            Username::new("acme").unwrap(),
            BoxName::new("web").unwrap(),
            BoxVersion::new("1.0.0").unwrap(),
            ProviderName::new("virtualbox").unwrap(),
            Architecture::new("amd64").unwrap(),
        )
    }

    fn prod() -> Endpoints {
        Endpoints::new(crate::config::DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn all_seven_paths_match_the_v2_api() {
        let (u, n, v, p, a) = fragments();
        let e = prod();
        let root = "https://app.vagrantup.com/api/v2";

        assert_eq!(e.box_get(&u, &n).url.as_str(), format!("{root}/box/acme/web"));
        assert_eq!(e.box_create().url.as_str(), format!("{root}/boxes"));
        assert_eq!(
            e.version_get(&u, &n, &v).url.as_str(),
            format!("{root}/box/acme/web/version/1.0.0")
        );
        assert_eq!(
            e.version_create(&u, &n).url.as_str(),
            format!("{root}/box/acme/web/versions")
        );
        assert_eq!(
            e.provider_get(&u, &n, &v, &p, &a).url.as_str(),
            format!("{root}/box/acme/web/version/1.0.0/provider/virtualbox/amd64")
        );
        assert_eq!(
            e.provider_create(&u, &n, &v).url.as_str(),
            format!("{root}/box/acme/web/version/1.0.0/providers")
        );
        assert_eq!(
            e.upload_get(&u, &n, &v, &p, &a).url.as_str(),
            format!("{root}/box/acme/web/version/1.0.0/provider/virtualbox/amd64/upload")
        );
    }

    #[test]
    fn methods_match_operations() {
        let (u, n, ..) = fragments();
        let e = prod();
        assert_eq!(e.box_get(&u, &n).method(), Method::GET);
        assert_eq!(e.box_create().method(), Method::POST);
        assert_eq!(e.version_create(&u, &n).method(), Method::POST);
        assert_eq!(Operation::UploadGet.method(), Method::GET);
        assert_eq!(Operation::ProviderCreate.as_str(), "provider.create");
    }

    #[test]
    fn reserved_characters_are_escaped_per_segment() {
        let e = prod();
        let u = Username::new("acme").unwrap();
        let n = BoxName::new("web box?#").unwrap();
        assert_eq!(
            e.box_get(&u, &n).url.as_str(),
            "https://app.vagrantup.com/api/v2/box/acme/web%20box%3F%23"
        );
    }

    #[test]
    fn base_with_trailing_slash_does_not_double_up() {
        let e = Endpoints::new("http://127.0.0.1:8080/api/v2/").unwrap();
        assert_eq!(e.box_create().url.as_str(), "http://127.0.0.1:8080/api/v2/boxes");
    }

    #[test]
    fn bare_host_base() {
        let e = Endpoints::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(e.box_create().url.as_str(), "http://127.0.0.1:8080/boxes");
    }

    #[test]
    fn create_box_body_shape() {
        let (u, n, ..) = fragments();
        let body = serde_json::to_value(CreateBoxRequest::new(&u, &n, false)).unwrap();
        assert_eq!(
            body,
            json!({"box": {"username": "acme", "name": "web", "is_private": false}})
        );
    }

    #[test]
    fn create_version_body_shape() {
        let (_, _, v, ..) = fragments();
        let body = serde_json::to_value(CreateVersionRequest::new(&v)).unwrap();
        assert_eq!(body, json!({"version": {"version": "1.0.0"}}));
    }

    #[test]
    fn create_provider_body_shape() {
        let (.., p, a) = fragments();
        let body = serde_json::to_value(CreateProviderRequest::new(&p, &a)).unwrap();
        assert_eq!(
            body,
            json!({"provider": {"name": "virtualbox", "architecture": "amd64"}})
        );
    }

    #[test]
    fn upload_target_ignores_extra_fields() {
        let target: UploadTarget =
            serde_json::from_value(json!({"upload_path": "X", "extra": "ignored"})).unwrap();
        assert_eq!(target.upload_path, "X");
    }

    #[test]
    fn upload_target_requires_upload_path() {
        let result = serde_json::from_value::<UploadTarget>(json!({"no_such_field": "x"}));
        assert!(result.is_err());
    }
}
