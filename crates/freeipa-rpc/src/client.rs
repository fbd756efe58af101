//! Asynchronous FreeIPA JSON-RPC transport.

use crate::options::Options;
use crate::Result;
use freeipa_core::error::IPA_NOT_FOUND_CODE;
use freeipa_core::{Credentials, Error, IpaConfig};
use reqwest::header::{ACCEPT, COOKIE, REFERER};
use reqwest::{Certificate, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("freeipa-rpc/", env!("CARGO_PKG_VERSION"));

const LOGIN_PATH: &str = "session/login_password";
const JSON_PATH: &str = "session/json";

/// Cookie the IPA web application issues on a successful login.
pub const SESSION_COOKIE: &str = "ipa_session";

/// Header carrying the reason for a rejected login.
pub const REJECTION_REASON_HEADER: &str = "X-IPA-Rejection-Reason";

/// Unauthenticated JSON-RPC client; [`RpcClient::login`] turns it into a session.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: Url,
    referer: String,
}

impl RpcClient {
    /// Build a client for the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the CA certificate cannot be loaded or
    /// the HTTP client cannot be built.
    pub fn new(config: &IpaConfig) -> Result<Self> {
        config.check()?;

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout());

        if !config.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = &config.tls_ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                Error::Config(format!(
                    "Failed to read CA certificate {}: {e}",
                    path.display()
                ))
            })?;
            let certificate = Certificate::from_pem(&pem)
                .map_err(|e| Error::Config(format!("Invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.rpc_base_url()?,
            referer: config.referer()?,
        })
    }

    /// Base URL of the IPA web application.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Log in with a user name and password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the server rejects the credentials (the message carries the
    /// server's rejection reason) or does not hand out a session cookie.
    pub async fn login(&self, credentials: &Credentials) -> Result<RpcSession> {
        let url = self.base_url.join(LOGIN_PATH)?;
        debug!(user = credentials.username(), "logging in to FreeIPA");

        let response = self
            .http
            .post(url)
            .header(REFERER, &self.referer)
            .header(ACCEPT, "text/plain")
            .form(&[
                ("user", credentials.username()),
                ("password", credentials.password()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let reason = response
                .headers()
                .get(REJECTION_REASON_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("invalid credentials")
                .to_string();
            warn!(user = credentials.username(), %reason, "FreeIPA rejected login");
            return Err(Error::Auth(format!(
                "login for `{}` rejected: {reason}",
                credentials.username()
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_to_error(status, text));
        }

        let cookie = response
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| {
                Error::Auth(format!(
                    "login for `{}` returned no {SESSION_COOKIE} cookie",
                    credentials.username()
                ))
            })?;

        Ok(RpcSession {
            client: self.clone(),
            principal: credentials.username().to_string(),
            cookie: SecretString::from(cookie),
        })
    }
}

/// An authenticated JSON-RPC session.
///
/// Cheap to clone; clones share the underlying connection pool and session cookie.
#[derive(Clone)]
pub struct RpcSession {
    client: RpcClient,
    principal: String,
    cookie: SecretString,
}

impl fmt::Debug for RpcSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcSession")
            .field("base_url", &self.client.base_url.as_str())
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

impl RpcSession {
    /// Name the session was opened for.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Invoke `method` with positional `args` and keyword `options`.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] if the session is no longer accepted
    /// - [`Error::NotFound`] if FreeIPA answers with its `NotFound` error
    /// - [`Error::Rpc`] for any other error object in the response
    /// - [`Error::Decoding`] if the response envelope is malformed
    pub async fn call(&self, method: &str, args: &[&str], options: Options) -> Result<RpcResult> {
        let url = self.client.base_url.join(JSON_PATH)?;
        debug!(method, args = args.len(), "calling FreeIPA method");

        let request = RpcRequest {
            id: 0,
            method,
            params: (args, &options),
        };

        let response = self
            .client
            .http
            .post(url)
            .header(REFERER, &self.client.referer)
            .header(ACCEPT, "application/json")
            .header(
                COOKIE,
                format!("{SESSION_COOKIE}={}", self.cookie.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_to_error(status, text));
        }

        let body = response.text().await?;
        let envelope: RpcResponse = serde_json::from_str(&body)?;
        envelope.into_result(method)
    }

    /// Check the session against the server; returns the server's version summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn ping(&self) -> Result<String> {
        let result = self.call("ping", &[], Options::new()).await?;
        Ok(result.summary.unwrap_or_default())
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: (&'a [&'a str], &'a Options),
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<RpcResult>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

impl RpcResponse {
    fn into_result(self, method: &str) -> Result<RpcResult> {
        if let Some(error) = self.error {
            debug!(method, code = error.code, name = %error.name, "FreeIPA returned an error");
            return Err(error.into());
        }
        self.result
            .ok_or_else(|| Error::decoding("result", format!("`{method}` returned no result")))
    }
}

/// The `result` member of a successful JSON-RPC response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcResult {
    /// The entry (or entries) the command operated on.
    #[serde(default)]
    pub result: Value,
    /// Primary key(s) of the affected entry.
    #[serde(default)]
    pub value: Value,
    /// Human readable summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Entry count for search commands.
    #[serde(default)]
    pub count: Option<i64>,
    /// Whether a search hit the size limit.
    #[serde(default)]
    pub truncated: Option<bool>,
    /// Per-member failures reported by membership commands.
    #[serde(default)]
    pub failed: Option<Value>,
    /// Number of members processed by membership commands.
    #[serde(default)]
    pub completed: Option<i64>,
}

/// The `error` member of a failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcErrorBody {
    /// Numeric FreeIPA error code.
    pub code: i64,
    /// Error class name, e.g. `NotFound`.
    #[serde(default)]
    pub name: String,
    /// Error message.
    #[serde(default)]
    pub message: String,
}

impl From<RpcErrorBody> for Error {
    fn from(body: RpcErrorBody) -> Self {
        if body.code == IPA_NOT_FOUND_CODE {
            Self::NotFound(body.message)
        } else {
            Self::Rpc {
                code: body.code,
                name: body.name,
                message: body.message,
            }
        }
    }
}

fn map_status_to_error(status: StatusCode, text: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Auth(format!("FreeIPA session rejected: {status}"))
        }
        StatusCode::NOT_FOUND => {
            Error::InvalidEndpoint(format!("FreeIPA endpoint missing: {text}"))
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            Error::ServiceUnavailable(format!("FreeIPA temporarily unavailable: {text}"))
        }
        status if status.is_server_error() => {
            Error::ServiceUnavailable(format!("FreeIPA server error {status}: {text}"))
        }
        _ => Error::Http(format!("FreeIPA error {status}: {text}")),
    }
}
