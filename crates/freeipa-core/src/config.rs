//! Configuration structures for FreeIPA clients.
//!
//! [`IpaConfig`] describes where the server lives and how to reach it over both transports.
//! [`Credentials`] carries the login used for the LDAP bind and the JSON-RPC password login.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

/// Environment variable holding the server host name.
pub const ENV_HOST: &str = "FREEIPA_HOST";
/// Environment variable holding the LDAP base DN.
pub const ENV_BASE_DN: &str = "FREEIPA_BASE_DN";
/// Environment variable toggling TLS verification (`false`/`0` disables it).
pub const ENV_TLS_VERIFY: &str = "FREEIPA_TLS_VERIFY";
/// Environment variable holding a CA certificate path.
pub const ENV_CA_CERT: &str = "FREEIPA_CA_CERT";

/// Default LDAPS port.
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Configuration for a FreeIPA client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IpaConfig {
    /// Server host name (e.g. `ipa.example.com`)
    #[validate(length(min = 1))]
    pub host: String,

    /// LDAP base DN (e.g. `dc=example,dc=com`)
    #[validate(length(min = 1))]
    pub base_dn: String,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to a PEM encoded CA certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// JSON-RPC request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Explicit LDAP URL; defaults to `ldaps://<host>:636`
    #[validate(url)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldap_url: Option<String>,

    /// LDAP connection timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_ldap_timeout_secs")]
    pub ldap_connection_timeout_secs: u64,

    /// LDAP per-operation timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_ldap_timeout_secs")]
    pub ldap_operation_timeout_secs: u64,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_ldap_timeout_secs() -> u64 {
    10
}

impl IpaConfig {
    /// Create a new configuration for the given host and base DN.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot form a valid URL or validation fails.
    pub fn new(host: impl Into<String>, base_dn: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            host: host.into(),
            base_dn: base_dn.into(),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: default_request_timeout_secs(),
            ldap_url: None,
            ldap_connection_timeout_secs: default_ldap_timeout_secs(),
            ldap_operation_timeout_secs: default_ldap_timeout_secs(),
        };

        config.check()?;
        Ok(config)
    }

    /// Build a configuration from `FREEIPA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the result fails validation.
    pub fn from_env() -> Result<Self, Error> {
        let host = std::env::var(ENV_HOST)
            .map_err(|_| Error::Config(format!("{ENV_HOST} is not set")))?;
        let base_dn = std::env::var(ENV_BASE_DN)
            .map_err(|_| Error::Config(format!("{ENV_BASE_DN} is not set")))?;

        let mut config = Self::new(host, base_dn)?;
        if let Ok(verify) = std::env::var(ENV_TLS_VERIFY) {
            config.tls_verify = !matches!(verify.trim(), "0" | "false" | "FALSE" | "no");
        }
        if let Ok(path) = std::env::var(ENV_CA_CERT) {
            config.tls_ca_cert = Some(PathBuf::from(path));
        }

        debug!(
            host = %config.host,
            base_dn = %config.base_dn,
            "loaded FreeIPA configuration from environment"
        );
        Ok(config)
    }

    /// Validate field ranges and derived URLs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;
        self.rpc_base_url()?;
        Ok(())
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Override the LDAP URL.
    #[must_use]
    pub fn with_ldap_url(mut self, url: impl Into<String>) -> Self {
        self.ldap_url = Some(url.into());
        self
    }

    /// Override the LDAP connection and operation timeouts in seconds.
    #[must_use]
    pub const fn with_ldap_timeouts(mut self, connect_secs: u64, operation_secs: u64) -> Self {
        self.ldap_connection_timeout_secs = connect_secs;
        self.ldap_operation_timeout_secs = operation_secs;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the LDAP connection timeout as a Duration.
    #[must_use]
    pub const fn ldap_connection_timeout(&self) -> Duration {
        Duration::from_secs(self.ldap_connection_timeout_secs)
    }

    /// Get the LDAP operation timeout as a Duration.
    #[must_use]
    pub const fn ldap_operation_timeout(&self) -> Duration {
        Duration::from_secs(self.ldap_operation_timeout_secs)
    }

    /// Base URL of the IPA web application (`https://<host>/ipa/`).
    ///
    /// A host that already carries a scheme (useful against a local test server) is used as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn rpc_base_url(&self) -> Result<Url, Error> {
        let host = self.host.trim_end_matches('/');
        let raw = if host.contains("://") {
            format!("{host}/ipa/")
        } else {
            format!("https://{host}/ipa/")
        };
        Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid FreeIPA host: {e}")))
    }

    /// Referer header value required by the IPA web application.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot form a valid URL.
    pub fn referer(&self) -> Result<String, Error> {
        Ok(self.rpc_base_url()?.as_str().trim_end_matches('/').to_string())
    }

    /// LDAP URL, either the explicit override or `ldaps://<host>:636`.
    ///
    /// Only the host name is taken from `host`; a scheme or port given for the JSON-RPC
    /// endpoint does not carry over.
    #[must_use]
    pub fn ldap_url(&self) -> String {
        if let Some(url) = &self.ldap_url {
            return url.clone();
        }
        let host = self
            .rpc_base_url()
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.host.clone());
        format!("ldaps://{host}:{DEFAULT_LDAPS_PORT}")
    }
}

/// Login credentials for a FreeIPA account.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Login name (a uid such as `admin`, or a full bind DN).
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password in clear text; only for handing to a transport.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}
