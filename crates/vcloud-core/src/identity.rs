//! # Identity Fragments
//!
//! Newtypes for the pieces of a Vagrant Cloud box address:
//!
//! ```text
//! {username}/{name}/version/{version}/provider/{provider}/{architecture}
//! ```
//!
//! ## Validation
//!
//! All fragments are non-empty, carry no surrounding whitespace, no ASCII
//! control characters and no `/` (a fragment is always exactly one URL path
//! segment). [`BoxVersion`] additionally has to look like a release label:
//! it starts with a digit and only uses ASCII alphanumerics, `.`, `-` and `+`.
//!
//! Other reserved characters are accepted here and percent-escaped when the
//! request URL is built.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Validate the rules shared by every fragment.
fn validate_segment(field: &'static str, s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if s.trim() != s {
        return Err(ValidationError::SurroundingWhitespace {
            field,
            value: s.to_string(),
        });
    }
    if let Some(ch) = s.chars().find(|c| c.is_ascii_control() || *c == '/') {
        return Err(ValidationError::InvalidCharacter {
            field,
            value: s.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Vagrant Cloud account (user or organization) that owns a box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a username, validating it is a single non-empty path segment.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the `username` field.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        validate_segment("username", &s)?;
        Ok(Self(s))
    }

    /// Access the username string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Box name, unique within its owning account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoxName(String);

impl BoxName {
    /// Create a box name, validating it is a single non-empty path segment.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the `box name` field.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        validate_segment("box name", &s)?;
        Ok(Self(s))
    }

    /// Access the box name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Release label of a box, e.g. `1.0.0` or `2024.01.15-rc1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoxVersion(String);

impl BoxVersion {
    /// Create a box version, validating it is semver-shaped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidVersion`] if the label does not
    /// start with a digit or contains characters outside
    /// `[A-Za-z0-9.+-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        validate_segment("box version", &s)?;

        let starts_with_digit = s.chars().next().is_some_and(|c| c.is_ascii_digit());
        let allowed = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
        if !starts_with_digit || !allowed {
            return Err(ValidationError::InvalidVersion(s));
        }

        Ok(Self(s))
    }

    /// Access the version string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Virtualization backend a box is built for, e.g. `virtualbox` or `libvirt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Create a provider name.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the `provider` field.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        validate_segment("provider", &s)?;
        Ok(Self(s))
    }

    /// Access the provider name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// CPU architecture qualifying a provider, e.g. `amd64` or `arm64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Architecture(String);

impl Architecture {
    /// Create an architecture identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the `architecture` field.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        validate_segment("architecture", &s)?;
        Ok(Self(s))
    }

    /// Access the architecture string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Display, serde conversions and `AsRef<str>` are identical for every fragment.
macro_rules! fragment_impls {
    ($($ty:ident),+ $(,)?) => {$(
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    )+};
}

fragment_impls!(Username, BoxName, BoxVersion, ProviderName, Architecture);
