//! Integration tests for decoding FreeIPA JSON-RPC responses.
//!
//! The fixtures are `*_show --all` responses in the shape the IPA web application returns them.

use freeipa_core::Error;
use freeipa_rpc::{DnsRecord, DnsZone, FromAttributes, Group, RpcResult, User};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture and return the `result` member of its envelope.
fn load_result(name: &str) -> RpcResult {
    let fixture_path = fixtures_dir().join(name);
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    let mut envelope: serde_json::Value = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {name}: {e}"));
    assert!(envelope["error"].is_null(), "fixture {name} carries an error");
    serde_json::from_value(envelope["result"].take())
        .unwrap_or_else(|e| panic!("Failed to decode result of {name}: {e}"))
}

#[test]
fn test_decode_dns_zone() {
    let result = load_result("dnszone_show.json");
    let zone = DnsZone::from_value(result.result).unwrap();

    assert_eq!(zone.name, "example.test.");
    assert!(zone.name.is_absolute());
    assert!(zone.active.value());
    assert_eq!(zone.authoritative_nameserver, "ipa.example.test.");
    assert_eq!(zone.administrator_email, "hostmaster.example.test.");
    assert_eq!(zone.soa_serial.value(), 1_700_000_001);
    assert_eq!(zone.soa_expire.value(), 1_209_600);
    assert!(!zone.dynamic_update.value());
    assert_eq!(zone.allow_transfer, "none;");
    assert_eq!(
        zone.managed_by,
        "cn=example.test.,cn=dns,dc=example,dc=test"
    );
    // Not returned by the server.
    assert_eq!(zone.ttl.value(), 0);
    assert!(zone.forwarders.is_empty());
    assert!(!zone.is_reverse());
}

#[test]
fn test_decode_dns_record() {
    let result = load_result("dnsrecord_show.json");
    let record = DnsRecord::from_value(result.result).unwrap();

    assert_eq!(record.name, "mail");
    assert_eq!(record.ttl.value(), 3600);
    assert_eq!(record.a_records, vec!["192.0.2.25"]);
    assert_eq!(record.aaaa_records, vec!["2001:db8::25"]);
    assert_eq!(record.mx_records, vec!["10 mail.example.test."]);
    assert_eq!(record.txt_records, vec!["v=spf1 mx -all"]);
    assert!(record.records.is_null());
    assert_eq!(record.fqdn("example.test."), "mail.example.test.");
}

#[test]
fn test_decode_group() {
    let result = load_result("group_show.json");
    assert_eq!(result.value, serde_json::json!("admins"));
    let group = Group::from_value(result.result).unwrap();

    assert_eq!(group.gid, "admins");
    assert_eq!(group.description, "Account administrators group");
    assert_eq!(group.gid_number.value(), 1_314_400_000);
    assert_eq!(group.unique_id, "4f6d2c3e-1f21-11ee-9d5a-52540012ab34");
    assert_eq!(group.member_users, vec!["admin", "alice"]);
    assert!(group.member_of_groups.is_empty());
    assert!(group.is_posix());
}

#[test]
fn test_decode_user() {
    let result = load_result("user_show.json");
    let user = User::from_value(result.result).unwrap();

    assert_eq!(user.uid, "alice");
    assert_eq!(user.first_name, "Alice");
    assert_eq!(user.last_name, "Liddell");
    assert_eq!(user.home_directory, "/home/alice");
    assert_eq!(user.principals, vec!["alice@EXAMPLE.TEST"]);
    assert_eq!(user.ssh_public_keys.len(), 1);
    assert!(!user.locked.value());
    assert!(user.has_keytab.value());
    assert!(user.is_member_of("admins"));

    let changed = user.last_password_change.value().unwrap();
    assert_eq!(changed.to_rfc3339(), "2023-11-05T09:30:00+00:00");
    let expires = user.password_expiration.value().unwrap();
    assert!(user.password_expired_at(expires));
    assert!(!user.password_expired_at(changed));
}

#[test]
fn test_multi_valued_scalar_is_rejected_with_field_name() {
    let result = load_result("group_show_bad_gid.json");
    let err = Group::from_value(result.result).unwrap_err();
    match err {
        Error::Decoding { field, message } => {
            assert_eq!(field, "gidnumber");
            assert!(message.contains('2'), "unexpected message: {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_entities_deserialize_directly() {
    let result = load_result("group_show.json");
    let group: Group = serde_json::from_value(result.result).unwrap();
    assert_eq!(group.gid, "admins");
}
