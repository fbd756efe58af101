//! Entity operations on an authenticated [`RpcSession`].
//!
//! Reads request every attribute (`all: true`). Writes pin the API version FreeIPA should
//! interpret them against, see [`api_version`].

use crate::client::{RpcResult, RpcSession};
use crate::models::{DnsRecord, DnsZone, FromAttributes, Group, User};
use crate::options::Options;
use crate::Result;
use freeipa_core::Error;
use serde_json::Value;
use tracing::{trace, warn};

/// API versions pinned on write commands.
pub mod api_version {
    /// Version sent with `*_add` and membership commands.
    pub const ADD: &str = "2.228";
    /// Version sent with `*_mod` commands.
    pub const MOD: &str = "2.228";
    /// Version sent with `*_del` commands.
    pub const DEL: &str = "2.231";
}

/// Error name used when a membership command reports failed members.
pub const MEMBER_FAILURE: &str = "MemberFailure";

impl RpcSession {
    // DNS zones

    /// Fetch a DNS zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the zone does not exist.
    pub async fn get_dns_zone(&self, zone: &str) -> Result<DnsZone> {
        self.show("dnszone_show", &[zone]).await
    }

    /// Create a DNS zone. `options` carries the zone attributes, including `idnsname`.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the zone.
    pub async fn create_dns_zone(&self, options: Options) -> Result<DnsZone> {
        self.add("dnszone_add", &[], options).await
    }

    /// Delete a DNS zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the zone does not exist.
    pub async fn delete_dns_zone(&self, zone: &str) -> Result<()> {
        self.del("dnszone_del", &[zone], Options::new()).await
    }

    /// Set a single attribute of a DNS zone.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the modification.
    pub async fn modify_dns_zone(
        &self,
        zone: &str,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.modify("dnszone_mod", &[zone], attribute, value.into())
            .await
    }

    // DNS records

    /// Fetch the record set `record` in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the record does not exist.
    pub async fn get_dns_record(&self, record: &str, zone: &str) -> Result<DnsRecord> {
        self.show("dnsrecord_show", &[zone, record]).await
    }

    /// Create a DNS record. `options` carries `dnszoneidnsname`, `idnsname` and the record data.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the record.
    pub async fn create_dns_record(&self, options: Options) -> Result<DnsRecord> {
        self.add("dnsrecord_add", &[], options).await
    }

    /// Delete every record of `record` in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the record does not exist.
    pub async fn delete_dns_record(&self, record: &str, zone: &str) -> Result<()> {
        self.del("dnsrecord_del", &[zone, record], Options::new().all())
            .await
    }

    /// Set a single attribute of a DNS record.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the modification.
    pub async fn modify_dns_record(
        &self,
        record: &str,
        zone: &str,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.modify("dnsrecord_mod", &[zone, record], attribute, value.into())
            .await
    }

    // Groups

    /// Fetch a group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the group does not exist.
    pub async fn get_group(&self, name: &str) -> Result<Group> {
        self.show("group_show", &[name]).await
    }

    /// Create a group. Without `gid_number` FreeIPA allocates one.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the group, e.g. because it already exists.
    pub async fn create_group(
        &self,
        name: &str,
        description: &str,
        gid_number: Option<i64>,
    ) -> Result<Group> {
        let mut options = Options::new().with("description", description);
        if let Some(gid) = gid_number {
            options.insert("gidnumber", gid);
        }
        self.add("group_add", &[name], options).await
    }

    /// Delete a group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the group does not exist.
    pub async fn delete_group(&self, name: &str) -> Result<()> {
        self.del("group_del", &[name], Options::new()).await
    }

    /// Set a single attribute of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the modification.
    pub async fn modify_group(
        &self,
        name: &str,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.modify("group_mod", &[name], attribute, value.into())
            .await
    }

    /// Add user `uid` to group `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rpc`] named [`MEMBER_FAILURE`] if FreeIPA refuses the member, e.g.
    /// because the user does not exist or is already a member.
    pub async fn group_add_user(&self, name: &str, uid: &str) -> Result<Group> {
        self.membership("group_add_member", name, uid).await
    }

    /// Remove user `uid` from group `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rpc`] named [`MEMBER_FAILURE`] if `uid` is not a member.
    pub async fn group_remove_user(&self, name: &str, uid: &str) -> Result<Group> {
        self.membership("group_remove_member", name, uid).await
    }

    // Users

    /// Fetch a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the user does not exist.
    pub async fn get_user(&self, uid: &str) -> Result<User> {
        self.show("user_show", &[uid]).await
    }

    /// Create a user. `options` carries at least `givenname` and `sn`.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the user.
    pub async fn create_user(&self, uid: &str, options: Options) -> Result<User> {
        self.add("user_add", &[uid], options).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the user does not exist.
    pub async fn delete_user(&self, uid: &str) -> Result<()> {
        self.del("user_del", &[uid], Options::new()).await
    }

    /// Set a single attribute of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if FreeIPA rejects the modification.
    pub async fn modify_user(
        &self,
        uid: &str,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.modify("user_mod", &[uid], attribute, value.into())
            .await
    }

    async fn show<T: FromAttributes>(&self, method: &str, args: &[&str]) -> Result<T> {
        let result = self.call(method, args, Options::new().all()).await?;
        T::from_value(result.result)
    }

    async fn add<T: FromAttributes>(
        &self,
        method: &str,
        args: &[&str],
        options: Options,
    ) -> Result<T> {
        let result = self
            .call(method, args, options.version(api_version::ADD))
            .await?;
        trace!(method, payload = %result.result, "created entry");
        T::from_value(result.result)
    }

    async fn del(&self, method: &str, args: &[&str], options: Options) -> Result<()> {
        self.call(method, args, options.version(api_version::DEL))
            .await?;
        Ok(())
    }

    async fn modify(
        &self,
        method: &str,
        args: &[&str],
        attribute: &str,
        value: Value,
    ) -> Result<()> {
        let options = Options::new()
            .with(attribute, value)
            .version(api_version::MOD);
        self.call(method, args, options).await?;
        Ok(())
    }

    async fn membership(&self, method: &str, group: &str, uid: &str) -> Result<Group> {
        let options = Options::new()
            .with("user", vec![uid])
            .version(api_version::ADD);
        let result = self.call(method, &[group], options).await?;
        check_member_failures(method, &result)?;
        Group::from_value(result.result)
    }
}

/// Turns the `failed` member report of a membership command into an error.
fn check_member_failures(method: &str, result: &RpcResult) -> Result<()> {
    let failures = result
        .failed
        .as_ref()
        .map(member_failures)
        .unwrap_or_default();
    if failures.is_empty() {
        return Ok(());
    }

    warn!(method, failures = failures.len(), "FreeIPA refused members");
    Err(Error::Rpc {
        code: 0,
        name: MEMBER_FAILURE.to_string(),
        message: failures.join("; "),
    })
}

/// Flattens `{"member": {"user": [["bob", "no such entry"]], ...}}` into messages.
fn member_failures(failed: &Value) -> Vec<String> {
    let mut messages = Vec::new();
    for kinds in failed.as_object().into_iter().flat_map(|sections| sections.values()) {
        let Some(kinds) = kinds.as_object() else {
            continue;
        };
        for (kind, entries) in kinds {
            for entry in entries.as_array().into_iter().flatten() {
                match entry.as_array().map(Vec::as_slice) {
                    Some([name, reason, ..]) => {
                        messages.push(format!("{kind} {}: {}", text(name), text(reason)));
                    }
                    _ => messages.push(format!("{kind} {}", text(entry))),
                }
            }
        }
    }
    messages
}

fn text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}
