//! Bearer credential for the Vagrant Cloud API.
//!
//! The token is zeroized on drop and never printed: `Debug` is redacted,
//! the `Authorization` header value is marked sensitive, and no error
//! variant carries it.

use reqwest::header::HeaderValue;
use zeroize::Zeroizing;

use crate::error::VagrantCloudError;

/// Opaque bearer token supplied by the pipeline driver.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a token.
    ///
    /// # Errors
    ///
    /// Returns [`VagrantCloudError::InvalidToken`] if the token is empty or
    /// cannot be sent as an HTTP header value. The token itself is never
    /// included in the error.
    pub fn new(token: impl Into<String>) -> Result<Self, VagrantCloudError> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return Err(VagrantCloudError::InvalidToken {
                reason: "token is empty",
            });
        }
        let this = Self(token);
        this.header_value()?;
        Ok(this)
    }

    /// `Authorization` header value, flagged sensitive so that HTTP-level
    /// debug output redacts it.
    pub(crate) fn header_value(&self) -> Result<HeaderValue, VagrantCloudError> {
        let raw = Zeroizing::new(format!("Bearer {}", self.0.as_str()));
        let mut value = HeaderValue::from_str(&raw).map_err(|_| VagrantCloudError::InvalidToken {
            reason: "token contains characters not allowed in an HTTP header",
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}
