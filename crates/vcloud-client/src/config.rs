//! Vagrant Cloud client configuration.
//!
//! Holds the API base URL and the transport settings of the shared HTTP
//! client. Nothing is read from the environment or from files; the
//! pipeline driver constructs this explicitly.

use url::Url;

/// Production Vagrant Cloud API root.
pub const DEFAULT_BASE_URL: &str = "https://app.vagrantup.com/api/v2";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the Vagrant Cloud API.
///
/// The bearer token is not part of this struct. It is
/// supplied to the first stage of a session and lives only there.
#[derive(Debug, Clone)]
pub struct VagrantCloudConfig {
    /// API root every endpoint path is appended to.
    /// Default: <https://app.vagrantup.com/api/v2>
    pub base_url: String,
    /// Request timeout in seconds, applied by the HTTP client to every call.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for VagrantCloudConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("vcloud-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl VagrantCloudConfig {
    /// Replace the API root, e.g. for a self-hosted mirror.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` does not parse or
    /// cannot carry path segments (`mailto:`, `data:` and similar).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        parse_base_url(base_url)?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Replace the per-request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// The API root is `{server_uri}/api/v2` so that request paths match
    /// the production ones exactly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `server_uri` cannot be parsed.
    pub fn local_mock(server_uri: &str) -> Result<Self, ConfigError> {
        let base = format!("{}/api/v2", server_uri.trim_end_matches('/'));
        parse_base_url(&base)?;
        Ok(Self {
            base_url: base,
            timeout_secs: 5,
            ..Self::default()
        })
    }
}

/// Parse and check an API root.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            raw.to_string(),
            "URL cannot carry path segments".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_production() {
        let cfg = VagrantCloudConfig::default();
        assert_eq!(cfg.base_url, "https://app.vagrantup.com/api/v2");
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.user_agent.starts_with("vcloud-client/"));
    }

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = VagrantCloudConfig::local_mock("http://127.0.0.1:9000").unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:9000/api/v2");
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn local_mock_tolerates_trailing_slash() {
        let cfg = VagrantCloudConfig::local_mock("http://127.0.0.1:9000/").unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:9000/api/v2");
    }

    #[test]
    fn with_base_url_rejects_garbage() {
        let result = VagrantCloudConfig::default().with_base_url("not a url");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(..))));
    }

    #[test]
    fn with_base_url_rejects_cannot_be_a_base() {
        let result = VagrantCloudConfig::default().with_base_url("mailto:ops@example.com");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(..))));
    }

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let cfg = VagrantCloudConfig::default()
            .with_base_url("https://vagrant.example.com/api/v2/")
            .unwrap();
        assert_eq!(cfg.base_url, "https://vagrant.example.com/api/v2");
    }

    #[test]
    fn with_timeout_overrides() {
        let cfg = VagrantCloudConfig::default().with_timeout_secs(2);
        assert_eq!(cfg.timeout_secs, 2);
    }
}
