//! JSON-RPC client and entity models for the FreeIPA management API.
//!
//! [`RpcClient`] performs the password login against `/ipa/session/login_password` and hands
//! back an [`RpcSession`] carrying the `ipa_session` cookie. Every entity operation (DNS zones,
//! DNS records, groups, users) is a method on the session.
//!
//! ```no_run
//! # async fn demo() -> freeipa_rpc::Result<()> {
//! use freeipa_core::{Credentials, IpaConfig};
//! use freeipa_rpc::RpcClient;
//!
//! let config = IpaConfig::new("ipa.example.com", "dc=example,dc=com")?;
//! let session = RpcClient::new(&config)?
//!     .login(&Credentials::new("admin", "secret"))
//!     .await?;
//! let group = session.get_group("admins").await?;
//! println!("{} has {} members", group.gid, group.member_users.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod operations;
pub mod options;

pub use client::{RpcClient, RpcErrorBody, RpcResult, RpcSession};
pub use models::{DnsRecord, DnsZone, FromAttributes, Group, User};
pub use options::Options;

/// Convenient result alias that reuses the shared FreeIPA error type.
pub type Result<T> = freeipa_core::Result<T>;
