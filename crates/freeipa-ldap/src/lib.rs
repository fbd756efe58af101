//! LDAP client for the FreeIPA directory.
//!
//! This crate provides an authenticated search connection, an escaping filter builder and
//! lookups that resolve FreeIPA users, groups, DNS zones and DNS records by name or by
//! `ipaUniqueID`.

#![deny(missing_docs)]

mod client;
mod dn;
mod filter;
mod lookup;

pub use client::{LdapClient, LdapConnection, LdapEntry};
pub use dn::{DistinguishedName, DistinguishedNameError, RelativeDistinguishedName};
pub use filter::{escape_filter_value, Filter};
pub use lookup::{DNS_CONTAINER, GROUPS_CONTAINER, UNIQUE_ID_ATTRIBUTE, USERS_CONTAINER};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = freeipa_core::Result<T>;
