//! Tests against a live FreeIPA server.
//!
//! Ignored by default. Run with `cargo test -- --ignored` after exporting:
//!
//! - `FREEIPA_TEST_HOST` (e.g. `ipa.example.test`)
//! - `FREEIPA_TEST_BASE_DN` (e.g. `dc=example,dc=test`)
//! - `FREEIPA_TEST_ADMIN_USER` and `FREEIPA_TEST_ADMIN_PASSWD`
//! - `FREEIPA_TEST_TLS_VERIFY=false` for servers with a self-signed certificate

use freeipa_core::{Credentials, Error, IpaConfig};
use freeipa_ldap::{LdapClient, LdapConnection};
use freeipa_rpc::{Options, RpcClient, RpcSession};

const TEST_GROUP: &str = "test_group";

fn env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set for live tests"))
}

fn live_config() -> IpaConfig {
    let verify = std::env::var("FREEIPA_TEST_TLS_VERIFY").map_or(true, |v| v != "false");
    IpaConfig::new(env("FREEIPA_TEST_HOST"), env("FREEIPA_TEST_BASE_DN"))
        .unwrap()
        .with_tls_verify(verify)
}

fn admin() -> Credentials {
    Credentials::new(env("FREEIPA_TEST_ADMIN_USER"), env("FREEIPA_TEST_ADMIN_PASSWD"))
}

async fn rpc_session() -> RpcSession {
    RpcClient::new(&live_config())
        .unwrap()
        .login(&admin())
        .await
        .unwrap()
}

async fn ldap_connection() -> LdapConnection {
    LdapClient::new(live_config()).connect(&admin()).await.unwrap()
}

#[tokio::test]
#[ignore = "requires a live FreeIPA server"]
async fn test_ping() {
    let summary = rpc_session().await.ping().await.unwrap();
    assert!(summary.contains("IPA server version"), "{summary}");
}

#[tokio::test]
#[ignore = "requires a live FreeIPA server"]
async fn test_bad_password_is_rejected() {
    let err = RpcClient::new(&live_config())
        .unwrap()
        .login(&Credentials::new(env("FREEIPA_TEST_ADMIN_USER"), "definitely-wrong"))
        .await
        .unwrap_err();
    assert!(err.is_auth());

    let err = LdapClient::new(live_config())
        .connect(&Credentials::new(env("FREEIPA_TEST_ADMIN_USER"), "definitely-wrong"))
        .await
        .err()
        .unwrap();
    assert!(err.is_auth());
}

#[tokio::test]
#[ignore = "requires a live FreeIPA server"]
async fn test_group_lifecycle() {
    let session = rpc_session().await;
    let mut ldap = ldap_connection().await;

    assert!(!ldap.group_exists(TEST_GROUP).await.unwrap());

    let created = session.create_group(TEST_GROUP, "AARGH", None).await.unwrap();
    assert_eq!(created.gid, TEST_GROUP);
    assert_eq!(created.description, "AARGH");

    let fetched = session.get_group(TEST_GROUP).await.unwrap();
    assert_eq!(fetched.gid, TEST_GROUP);
    assert_eq!(fetched.description, "AARGH");
    assert_eq!(fetched.gid_number, created.gid_number);
    assert!(ldap.group_exists(TEST_GROUP).await.unwrap());
    assert_eq!(
        ldap.group_for_uuid(fetched.unique_id.as_str()).await.unwrap(),
        TEST_GROUP
    );

    session
        .modify_group(TEST_GROUP, "description", "calmer now")
        .await
        .unwrap();
    let modified = session.get_group(TEST_GROUP).await.unwrap();
    assert_eq!(modified.description, "calmer now");
    assert_eq!(modified.gid_number, created.gid_number);

    session.delete_group(TEST_GROUP).await.unwrap();
    assert!(!ldap.group_exists(TEST_GROUP).await.unwrap());
    assert!(matches!(
        session.get_group(TEST_GROUP).await,
        Err(Error::NotFound(_))
    ));

    ldap.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a live FreeIPA server"]
async fn test_user_membership() {
    let session = rpc_session().await;
    let mut ldap = ldap_connection().await;
    let uid = "test_user";

    let options = Options::new().with("givenname", "Test").with("sn", "User");
    let user = session.create_user(uid, options).await.unwrap();
    assert_eq!(user.uid, uid);
    assert!(ldap.user_exists(uid).await.unwrap());

    session.create_group(TEST_GROUP, "membership", None).await.unwrap();
    let group = session.group_add_user(TEST_GROUP, uid).await.unwrap();
    assert!(group.has_member(uid));
    assert!(session.group_add_user(TEST_GROUP, uid).await.is_err());

    session.group_remove_user(TEST_GROUP, uid).await.unwrap();
    session.delete_group(TEST_GROUP).await.unwrap();
    session.delete_user(uid).await.unwrap();
    assert!(!ldap.user_exists(uid).await.unwrap());

    ldap.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a live FreeIPA server"]
async fn test_dns_record_lifecycle() {
    let session = rpc_session().await;
    let mut ldap = ldap_connection().await;
    let zone = "rust-client.test.";

    let options = Options::new()
        .with("idnsname", zone)
        .with("skip_overlap_check", true);
    let created = session.create_dns_zone(options).await.unwrap();
    assert_eq!(created.name, zone);
    assert!(ldap.dns_zone_exists(zone).await.unwrap());

    let options = Options::new()
        .with("dnszoneidnsname", zone)
        .with("idnsname", "www")
        .with("a_part_ip_address", "192.0.2.10");
    session.create_dns_record(options).await.unwrap();
    session
        .modify_dns_record("www", zone, "dnsttl", 600)
        .await
        .unwrap();
    let record = session.get_dns_record("www", zone).await.unwrap();
    assert_eq!(record.a_records, vec!["192.0.2.10"]);
    assert_eq!(record.ttl.value(), 600);
    assert_eq!(ldap.dns_record("www", zone).await.unwrap(), "www");

    session.delete_dns_record("www", zone).await.unwrap();
    assert!(!ldap.dns_record_exists("www", zone).await.unwrap());
    session.delete_dns_zone(zone).await.unwrap();
    assert!(!ldap.dns_zone_exists(zone).await.unwrap());

    ldap.close().await.unwrap();
}
