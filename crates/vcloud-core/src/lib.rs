#![deny(missing_docs)]

//! # vcloud-core -- Identity Fragments for Vagrant Cloud Boxes
//!
//! A Vagrant Cloud box is addressed by a tuple of short identifiers:
//! `username/name`, then a version, then a provider and architecture pair.
//! This crate gives each fragment its own newtype so that a [`BoxVersion`]
//! can never be passed where a [`ProviderName`] is expected, and validates
//! every fragment once at construction.
//!
//! It has no I/O and no internal crate dependencies; only `serde` and
//! `thiserror` from the external ecosystem.

pub mod error;
pub mod identity;

pub use error::ValidationError;
pub use identity::{Architecture, BoxName, BoxVersion, ProviderName, Username};
