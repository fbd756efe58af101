//! # freeipa-core
//!
//! Core types and utilities shared by the FreeIPA LDAP and JSON-RPC clients.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy shared by both transports
//! - [`types`] - Typed scalar decoders for FreeIPA's loosely-typed attribute values
//! - [`config`] - Server configuration and login credentials

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Credentials, IpaConfig};
pub use error::{Error, Result};
pub use types::{IpaBool, IpaDateTime, IpaDnsName, IpaFloat, IpaInt, IpaScalar, IpaString};
