//! Validation errors for identity fragments.

use thiserror::Error;

/// Domain primitive validation failure.
///
/// Every variant carries the rejected value so that operators can see
/// exactly what the pipeline driver passed in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The fragment was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Which identity fragment was rejected.
        field: &'static str,
    },

    /// The fragment has leading or trailing whitespace.
    #[error("{field} has surrounding whitespace: \"{value}\"")]
    SurroundingWhitespace {
        /// Which identity fragment was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The fragment contains a character that is never valid in it.
    #[error("{field} contains invalid character {ch:?}: \"{value}\"")]
    InvalidCharacter {
        /// Which identity fragment was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// The first offending character.
        ch: char,
    },

    /// The version does not look like a release label (e.g. `1.0.0`).
    #[error("invalid box version: \"{0}\" (expected a semver-shaped label such as 1.0.0)")]
    InvalidVersion(String),
}
