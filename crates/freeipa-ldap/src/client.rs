//! LDAP transport for the FreeIPA directory.
//!
//! [`LdapClient`] opens authenticated [`LdapConnection`]s. A connection runs one search at a
//! time (`&mut self`) and must be closed with [`LdapConnection::close`] once the caller is done.

use crate::dn::{DistinguishedName, RelativeDistinguishedName};
use crate::{filter::Filter, lookup::USERS_CONTAINER, Result};
use async_trait::async_trait;
use freeipa_core::{Credentials, Error, IpaConfig};
use ldap3::{
    LdapConnAsync, LdapConnSettings, LdapError, LdapResult, Scope, SearchEntry, SearchResult,
};
use native_tls::{Certificate, TlsConnector};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;
/// LDAP result code returned when the search base does not exist.
const RC_NO_SUCH_OBJECT: u32 = 32;

/// Raw directory entry returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LdapEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map; value order is preserved from the server.
    pub attributes: HashMap<String, Vec<String>>,
}

impl LdapEntry {
    /// Returns all values for the attribute. Attribute names match case-insensitively.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .map(|(_, values)| values.as_slice())
    }

    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.values(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Parses the entry DN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDn`] if the server sent a malformed DN.
    pub fn distinguished_name(&self) -> Result<DistinguishedName> {
        Ok(DistinguishedName::parse(&self.dn)?)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapSession: Send {
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()>;
    async fn search(
        &mut self,
        base_dn: &str,
        scope: Scope,
        filter: &str,
        attributes: Vec<String>,
    ) -> Result<Vec<LdapEntry>>;
    async fn unbind(&mut self) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn LdapSession>>;
}

/// Factory for authenticated LDAP connections.
pub struct LdapClient {
    config: Arc<IpaConfig>,
    connector: Box<dyn LdapConnector>,
}

impl LdapClient {
    /// Creates a client that uses the real `ldap3` connector.
    #[must_use]
    pub fn new(config: IpaConfig) -> Self {
        let config = Arc::new(config);
        let connector: Box<dyn LdapConnector> = Box::new(RealLdapConnector::new(config.clone()));
        Self { config, connector }
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_connector(config: IpaConfig, connector: Box<dyn LdapConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &IpaConfig {
        &self.config
    }

    /// Opens a connection and binds with `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the bind is rejected, or a transport error when the server
    /// cannot be reached.
    pub async fn connect(&self, credentials: &Credentials) -> Result<LdapConnection> {
        let base_dn = DistinguishedName::parse(&self.config.base_dn)?;
        let bind_dn = bind_dn(credentials.username(), &base_dn)?;
        let operation_timeout = self.config.ldap_operation_timeout();

        let mut session = self.connector.connect().await?;
        let bound = timeout(
            operation_timeout,
            session.simple_bind(&bind_dn, credentials.password()),
        )
        .await
        .map_err(|_| Error::Timeout("LDAP bind timed out".to_string()))?;

        if let Err(err) = bound {
            warn!(bind_dn = %bind_dn, "LDAP bind rejected");
            // Best effort.
            let _ = session.unbind().await;
            return Err(err);
        }

        debug!(bind_dn = %bind_dn, "LDAP bind succeeded");
        Ok(LdapConnection {
            session,
            base_dn,
            operation_timeout,
        })
    }
}

/// An authenticated LDAP connection scoped to the configured base DN.
pub struct LdapConnection {
    session: Box<dyn LdapSession>,
    base_dn: DistinguishedName,
    operation_timeout: Duration,
}

impl LdapConnection {
    /// Connects to `host` and binds as `username`.
    ///
    /// `username` may be a bare uid (placed under `cn=users,cn=accounts`) or a full bind DN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid host or base DN and [`Error::Auth`] when the bind
    /// is rejected.
    pub async fn connect(
        host: &str,
        base_dn: &str,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let config = IpaConfig::new(host, base_dn)?;
        LdapClient::new(config)
            .connect(&Credentials::new(username, password))
            .await
    }

    /// Returns the directory base DN all searches are scoped to.
    #[must_use]
    pub fn base_dn(&self) -> &DistinguishedName {
        &self.base_dn
    }

    /// Searches the subtree at `base` (relative to the base DN; empty for the base DN itself).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDn`] for a malformed `base` and [`Error::Search`] when the server
    /// rejects the search.
    pub async fn search(
        &mut self,
        base: &str,
        filter: &Filter,
        attributes: &[&str],
    ) -> Result<Vec<LdapEntry>> {
        let absolute = if base.trim().is_empty() {
            self.base_dn.clone()
        } else {
            DistinguishedName::parse(base)?.join(&self.base_dn)
        };
        self.search_absolute(&absolute, filter, attributes).await
    }

    /// Searches the subtree at a base built from [`DistinguishedName`] parts, relative to the
    /// base DN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] when the server rejects the search.
    pub async fn search_dn(
        &mut self,
        base: &DistinguishedName,
        filter: &Filter,
        attributes: &[&str],
    ) -> Result<Vec<LdapEntry>> {
        let absolute = base.clone().join(&self.base_dn);
        self.search_absolute(&absolute, filter, attributes).await
    }

    async fn search_absolute(
        &mut self,
        base: &DistinguishedName,
        filter: &Filter,
        attributes: &[&str],
    ) -> Result<Vec<LdapEntry>> {
        let base = base.to_string();
        let filter = filter.to_string();
        debug!(base = %base, filter = %filter, "LDAP search");

        let attributes = attributes.iter().map(|a| (*a).to_string()).collect();
        timeout(
            self.operation_timeout,
            self.session.search(&base, Scope::Subtree, &filter, attributes),
        )
        .await
        .map_err(|_| Error::Timeout("LDAP search timed out".to_string()))?
    }

    /// Unbinds and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the unbind request could not be sent.
    pub async fn close(mut self) -> Result<()> {
        timeout(self.operation_timeout, self.session.unbind())
            .await
            .map_err(|_| Error::Timeout("LDAP unbind timed out".to_string()))?
    }
}

/// Bind DN for `username`.
///
/// A username that is already a DN is used as is. Anything else is a login placed under the
/// users container, with DN special characters escaped.
fn bind_dn(username: &str, base_dn: &DistinguishedName) -> Result<String> {
    if username.contains('=') {
        if let Ok(dn) = DistinguishedName::parse(username) {
            return Ok(dn.to_string());
        }
    }
    let user = DistinguishedName::parse(USERS_CONTAINER)?
        .with_prefix(RelativeDistinguishedName::new("uid", username))
        .join(base_dn);
    Ok(user.to_string())
}

/// Maps a bind response to the client error taxonomy.
fn bind_outcome(dn: &str, result: &LdapResult) -> Result<()> {
    match result.rc {
        0 => Ok(()),
        RC_INVALID_CREDENTIALS => Err(Error::Auth(format!("invalid credentials for {dn}"))),
        _ => Err(Error::Auth(format!("bind failed for {dn}: {result}"))),
    }
}

/// Maps a search response to its entries. A missing search base yields no entries.
fn search_outcome(result: SearchResult) -> Result<Vec<LdapEntry>> {
    if result.1.rc == RC_NO_SUCH_OBJECT {
        return Ok(Vec::new());
    }

    let (entries, _) = result
        .success()
        .map_err(|err| Error::Search(err.to_string()))?;
    Ok(entries
        .into_iter()
        .map(SearchEntry::construct)
        .map(|entry| LdapEntry {
            dn: entry.dn,
            attributes: entry.attrs,
        })
        .collect())
}

fn transport_error(operation: &str, err: LdapError) -> Error {
    Error::ServiceUnavailable(format!("LDAP {operation}: {err}"))
}

/// Real LDAP connector backed by `ldap3`.
pub struct RealLdapConnector {
    config: Arc<IpaConfig>,
}

impl RealLdapConnector {
    /// Creates a new connector instance.
    #[must_use]
    pub fn new(config: Arc<IpaConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LdapConnector for RealLdapConnector {
    async fn connect(&self) -> Result<Box<dyn LdapSession>> {
        let settings = build_ldap_settings(&self.config)?;
        let url = self.config.ldap_url();
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|err| Error::ServiceUnavailable(format!("LDAP connect to {url}: {err}")))?;
        ldap3::drive!(conn);
        Ok(Box::new(RealLdapSession { inner: ldap }))
    }
}

struct RealLdapSession {
    inner: ldap3::Ldap,
}

#[async_trait]
impl LdapSession for RealLdapSession {
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()> {
        let result = self
            .inner
            .simple_bind(dn, password)
            .await
            .map_err(|err| transport_error("bind", err))?;
        bind_outcome(dn, &result)
    }

    async fn search(
        &mut self,
        base_dn: &str,
        scope: Scope,
        filter: &str,
        attributes: Vec<String>,
    ) -> Result<Vec<LdapEntry>> {
        let result = self
            .inner
            .search(base_dn, scope, filter, attributes)
            .await
            .map_err(|err| Error::Search(err.to_string()))?;
        search_outcome(result)
    }

    async fn unbind(&mut self) -> Result<()> {
        self.inner
            .unbind()
            .await
            .map_err(|err| transport_error("unbind", err))
    }
}

fn build_ldap_settings(config: &IpaConfig) -> Result<LdapConnSettings> {
    let mut settings = LdapConnSettings::new().set_conn_timeout(config.ldap_connection_timeout());

    if !config.tls_verify {
        let connector = TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| Error::Config(format!("failed to construct TLS connector: {err}")))?;
        settings = settings.set_connector(connector).set_no_tls_verify(true);
    } else if let Some(cert_path) = &config.tls_ca_cert {
        let pem = fs::read(cert_path).map_err(|err| {
            Error::Config(format!(
                "failed to read CA certificate {}: {err}",
                cert_path.display()
            ))
        })?;
        let certificate = Certificate::from_pem(&pem)
            .map_err(|err| Error::Config(format!("invalid CA certificate: {err}")))?;
        let connector = TlsConnector::builder()
            .add_root_certificate(certificate)
            .build()
            .map_err(|err| Error::Config(format!("failed to load CA certificate: {err}")))?;
        settings = settings.set_connector(connector);
    }

    Ok(settings)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_config() -> IpaConfig {
        IpaConfig::new("ipa.example.com", "dc=example,dc=com").unwrap()
    }

    pub(crate) fn entry(dn: &str, attributes: &[(&str, &str)]) -> LdapEntry {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in attributes {
            map.entry((*name).to_string())
                .or_default()
                .push((*value).to_string());
        }
        LdapEntry {
            dn: dn.to_string(),
            attributes: map,
        }
    }

    /// Builds a connection around a mocked session that accepts one bind.
    pub(crate) async fn connection_with(session: MockLdapSession) -> LdapConnection {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .return_once(move || Ok(Box::new(session)));
        let client = LdapClient::with_connector(sample_config(), Box::new(connector));
        client
            .connect(&Credentials::new("admin", "secret"))
            .await
            .unwrap()
    }

    #[test]
    fn entry_attribute_lookup_is_case_insensitive() {
        let entry = entry(
            "idnsname=example.com.,cn=dns,dc=example,dc=com",
            &[("idnsName", "example.com."), ("objectClass", "top")],
        );
        assert_eq!(entry.first("idnsname"), Some("example.com."));
        assert_eq!(entry.values("OBJECTCLASS").unwrap().len(), 1);
        assert!(entry.first("dnsttl").is_none());
        assert_eq!(
            entry.distinguished_name().unwrap().leaf_value(),
            Some("example.com.")
        );
    }

    #[tokio::test]
    async fn connect_binds_with_user_dn() {
        let mut session = MockLdapSession::new();
        session
            .expect_simple_bind()
            .withf(|dn, password| {
                dn == "uid=admin,cn=users,cn=accounts,dc=example,dc=com" && password == "secret"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let connection = connection_with(session).await;
        assert_eq!(connection.base_dn().to_string(), "dc=example,dc=com");
    }

    fn base_dn() -> DistinguishedName {
        DistinguishedName::parse("dc=example,dc=com").unwrap()
    }

    fn ldap_result(rc: u32) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: String::new(),
            refs: Vec::new(),
            ctrls: Vec::new(),
        }
    }

    #[test]
    fn bind_dn_places_login_under_users_container() {
        assert_eq!(
            bind_dn("admin", &base_dn()).unwrap(),
            "uid=admin,cn=users,cn=accounts,dc=example,dc=com"
        );
        assert_eq!(
            bind_dn("smith, john", &base_dn()).unwrap(),
            "uid=smith\\2c john,cn=users,cn=accounts,dc=example,dc=com"
        );
    }

    #[test]
    fn bind_dn_keeps_full_dn() {
        assert_eq!(
            bind_dn("cn=Directory Manager", &base_dn()).unwrap(),
            "cn=Directory Manager"
        );
    }

    #[test]
    fn bind_outcome_maps_result_codes() {
        assert!(bind_outcome("uid=admin", &ldap_result(0)).is_ok());
        match bind_outcome("uid=admin", &ldap_result(RC_INVALID_CREDENTIALS)) {
            Err(Error::Auth(message)) => assert!(message.contains("invalid credentials")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        // insufficientAccessRights
        match bind_outcome("uid=admin", &ldap_result(50)) {
            Err(Error::Auth(message)) => assert!(message.contains("bind failed")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn search_outcome_treats_missing_base_as_empty() {
        let missing = SearchResult(Vec::new(), ldap_result(RC_NO_SUCH_OBJECT));
        assert!(search_outcome(missing).unwrap().is_empty());

        let empty = SearchResult(Vec::new(), ldap_result(0));
        assert!(search_outcome(empty).unwrap().is_empty());

        // sizeLimitExceeded
        let rejected = SearchResult(Vec::new(), ldap_result(4));
        assert!(matches!(search_outcome(rejected), Err(Error::Search(_))));
    }

    #[test]
    fn transport_failures_are_service_unavailable() {
        let err = transport_error("bind", LdapError::EndOfStream);
        assert!(matches!(err, Error::ServiceUnavailable(ref m) if m.starts_with("LDAP bind")));
    }

    #[tokio::test]
    async fn connect_escapes_login_in_bind_dn() {
        let mut session = MockLdapSession::new();
        session
            .expect_simple_bind()
            .withf(|dn, _| dn == "uid=smith\\2c john,cn=users,cn=accounts,dc=example,dc=com")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .return_once(move || Ok(Box::new(session)));

        let client = LdapClient::with_connector(sample_config(), Box::new(connector));
        assert!(client
            .connect(&Credentials::new("smith, john", "secret"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn connect_rejected_bind_is_auth_error() {
        let mut session = MockLdapSession::new();
        session
            .expect_simple_bind()
            .returning(|dn, _| Err(Error::Auth(format!("invalid credentials for {dn}"))));
        session.expect_unbind().times(1).returning(|| Ok(()));

        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .return_once(move || Ok(Box::new(session)));

        let client = LdapClient::with_connector(sample_config(), Box::new(connector));
        let result = client.connect(&Credentials::new("admin", "wrong")).await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn search_joins_base_dn_and_renders_filter() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session
            .expect_search()
            .withf(|base, scope, filter, attributes| {
                base == "cn=users,cn=accounts,dc=example,dc=com"
                    && *scope == Scope::Subtree
                    && filter == "(ipaUniqueID=700f8110-a12d-11e7-94f9-f669ff8b2c7c)"
                    && attributes == &vec!["cn".to_string(), "dn".to_string()]
            })
            .returning(|_, _, _, _| {
                Ok(vec![entry(
                    "uid=admin,cn=users,cn=accounts,dc=example,dc=com",
                    &[("cn", "Administrator")],
                )])
            });
        session.expect_unbind().times(1).returning(|| Ok(()));

        let mut connection = connection_with(session).await;
        let entries = connection
            .search(
                "cn=users,cn=accounts",
                &Filter::eq("ipaUniqueID", "700f8110-a12d-11e7-94f9-f669ff8b2c7c"),
                &["cn", "dn"],
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].first("cn"), Some("Administrator"));

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn search_with_empty_base_uses_base_dn() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session
            .expect_search()
            .withf(|base, _, _, _| base == "dc=example,dc=com")
            .returning(|_, _, _, _| Ok(Vec::new()));

        let mut connection = connection_with(session).await;
        let entries = connection
            .search("", &Filter::present("objectClass"), &[])
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn search_propagates_transport_errors() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session
            .expect_search()
            .returning(|_, _, _, _| Err(Error::Search("connection reset".to_string())));

        let mut connection = connection_with(session).await;
        let result = connection
            .search("cn=dns", &Filter::eq("idnsname", "example.com."), &[])
            .await;
        assert!(matches!(result, Err(Error::Search(_))));
    }
}
