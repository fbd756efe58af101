//! Directory lookups for FreeIPA objects.
//!
//! Every lookup is one subtree search under a fixed container of the FreeIPA tree. Resolvers
//! return the object's primary name and require exactly one match; existence checks count
//! matches and fetch no attributes.

use crate::client::LdapConnection;
use crate::dn::{DistinguishedName, RelativeDistinguishedName};
use crate::filter::Filter;
use crate::Result;
use freeipa_core::Error;
use tracing::warn;

/// Container holding DNS zones, relative to the base DN.
pub const DNS_CONTAINER: &str = "cn=dns";
/// Container holding user accounts, relative to the base DN.
pub const USERS_CONTAINER: &str = "cn=users,cn=accounts";
/// Container holding groups, relative to the base DN.
pub const GROUPS_CONTAINER: &str = "cn=groups,cn=accounts";

/// Attribute carrying FreeIPA's stable object identifier.
pub const UNIQUE_ID_ATTRIBUTE: &str = "ipaUniqueID";

/// Special attribute list that asks the server to return no attributes (RFC 4511).
const NO_ATTRIBUTES: &str = "1.1";

/// A single-object search: where to look, what to match, which attribute names the object.
struct Lookup {
    kind: &'static str,
    base: DistinguishedName,
    filter: Filter,
    name_attribute: &'static str,
}

impl Lookup {
    fn dns_zone(zone: &str) -> Result<Self> {
        Ok(Self {
            kind: "DNS zone",
            base: DistinguishedName::parse(DNS_CONTAINER)?,
            filter: Filter::eq("idnsname", zone),
            name_attribute: "idnsname",
        })
    }

    fn dns_record(record: &str, zone: &str) -> Result<Self> {
        let base = DistinguishedName::parse(DNS_CONTAINER)?
            .with_prefix(RelativeDistinguishedName::new("idnsname", zone));
        Ok(Self {
            kind: "DNS record",
            base,
            filter: Filter::eq("idnsname", record),
            name_attribute: "idnsname",
        })
    }

    fn user(filter: Filter) -> Result<Self> {
        Ok(Self {
            kind: "user",
            base: DistinguishedName::parse(USERS_CONTAINER)?,
            filter,
            name_attribute: "uid",
        })
    }

    fn group(filter: Filter) -> Result<Self> {
        Ok(Self {
            kind: "group",
            base: DistinguishedName::parse(GROUPS_CONTAINER)?,
            filter,
            name_attribute: "cn",
        })
    }
}

impl LdapConnection {
    /// Resolves a DNS zone to its `idnsname`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match, [`Error::Integrity`] for more than one.
    pub async fn dns_zone(&mut self, zone: &str) -> Result<String> {
        self.resolve(Lookup::dns_zone(zone)?).await
    }

    /// Returns true if the DNS zone exists.
    ///
    /// # Errors
    ///
    /// [`Error::Integrity`] if more than one zone matches.
    pub async fn dns_zone_exists(&mut self, zone: &str) -> Result<bool> {
        self.exists(Lookup::dns_zone(zone)?).await
    }

    /// Resolves a record inside `zone` to its `idnsname`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match, [`Error::Integrity`] for more than one.
    pub async fn dns_record(&mut self, record: &str, zone: &str) -> Result<String> {
        self.resolve(Lookup::dns_record(record, zone)?).await
    }

    /// Returns true if the record exists inside `zone`. A missing zone counts as no match.
    ///
    /// # Errors
    ///
    /// [`Error::Integrity`] if more than one record matches.
    pub async fn dns_record_exists(&mut self, record: &str, zone: &str) -> Result<bool> {
        self.exists(Lookup::dns_record(record, zone)?).await
    }

    /// Resolves a user login to its `uid`, as stored in the directory.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match, [`Error::Integrity`] for more than one.
    pub async fn user(&mut self, uid: &str) -> Result<String> {
        self.resolve(Lookup::user(Filter::eq("uid", uid))?).await
    }

    /// Resolves a group name to its `cn`, as stored in the directory.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match, [`Error::Integrity`] for more than one.
    pub async fn group(&mut self, cn: &str) -> Result<String> {
        self.resolve(Lookup::group(Filter::eq("cn", cn))?).await
    }

    /// Returns true if a user with login `uid` exists.
    ///
    /// # Errors
    ///
    /// [`Error::Integrity`] if more than one user matches.
    pub async fn user_exists(&mut self, uid: &str) -> Result<bool> {
        self.exists(Lookup::user(Filter::eq("uid", uid))?).await
    }

    /// Returns true if a group named `cn` exists.
    ///
    /// # Errors
    ///
    /// [`Error::Integrity`] if more than one group matches.
    pub async fn group_exists(&mut self, cn: &str) -> Result<bool> {
        self.exists(Lookup::group(Filter::eq("cn", cn))?).await
    }

    /// Resolves a user's `ipaUniqueID` to its login name.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match, [`Error::Integrity`] for more than one.
    pub async fn user_for_uuid(&mut self, uuid: &str) -> Result<String> {
        self.resolve(Lookup::user(Filter::eq(UNIQUE_ID_ATTRIBUTE, uuid))?)
            .await
    }

    /// Resolves a group's `ipaUniqueID` to its name.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match, [`Error::Integrity`] for more than one.
    pub async fn group_for_uuid(&mut self, uuid: &str) -> Result<String> {
        self.resolve(Lookup::group(Filter::eq(UNIQUE_ID_ATTRIBUTE, uuid))?)
            .await
    }

    /// Returns true if a user carries the given `ipaUniqueID`.
    ///
    /// # Errors
    ///
    /// [`Error::Integrity`] if more than one user matches.
    pub async fn user_exists_for_uuid(&mut self, uuid: &str) -> Result<bool> {
        self.exists(Lookup::user(Filter::eq(UNIQUE_ID_ATTRIBUTE, uuid))?)
            .await
    }

    /// Returns true if a group carries the given `ipaUniqueID`.
    ///
    /// # Errors
    ///
    /// [`Error::Integrity`] if more than one group matches.
    pub async fn group_exists_for_uuid(&mut self, uuid: &str) -> Result<bool> {
        self.exists(Lookup::group(Filter::eq(UNIQUE_ID_ATTRIBUTE, uuid))?)
            .await
    }

    async fn resolve(&mut self, lookup: Lookup) -> Result<String> {
        let mut entries = self
            .search_dn(&lookup.base, &lookup.filter, &[lookup.name_attribute])
            .await?;

        match entries.len() {
            0 => Err(Error::NotFound(format!(
                "no {} matches {}",
                lookup.kind, lookup.filter
            ))),
            1 => {
                let entry = entries.remove(0);
                entry
                    .first(lookup.name_attribute)
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        Error::decoding(lookup.name_attribute, format!("missing from {}", entry.dn))
                    })
            }
            n => Err(too_many(&lookup, n)),
        }
    }

    async fn exists(&mut self, lookup: Lookup) -> Result<bool> {
        let entries = self
            .search_dn(&lookup.base, &lookup.filter, &[NO_ATTRIBUTES])
            .await?;

        match entries.len() {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(too_many(&lookup, n)),
        }
    }
}

fn too_many(lookup: &Lookup, count: usize) -> Error {
    warn!(kind = lookup.kind, filter = %lookup.filter, count, "identifier matched several entries");
    Error::Integrity(format!(
        "{count} {} entries match {}",
        lookup.kind, lookup.filter
    ))
}
