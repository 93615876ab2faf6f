//! HTTP client for the control-plane API.
//!
//! [`YbaClient`] wraps a [`reqwest::Client`] configured once with the fixed
//! auth header and JSON content negotiation. Every call issues exactly one
//! request and either returns the parsed JSON body or fails: transport
//! problems surface as [`Error::Transport`], non-2xx statuses as
//! [`Error::Api`] with the structured `error` message extracted, and
//! non-JSON success bodies as [`Error::Protocol`] with the raw text
//! attached. Nothing is retried.
//!
//! # Examples
//!
//! ```no_run
//! use yba_client::YbaClient;
//!
//! # async fn demo() -> yba_client::Result<()> {
//! let client = YbaClient::builder()
//!     .base_url("https://yba.example.com")
//!     .api_token("token")
//!     .customer_id("11d78d93-1381-4d1d-8393-ba76f47ba7a6")
//!     .build()?;
//! let universes = client.get("/api/v1/customers/11d78d93-1381-4d1d-8393-ba76f47ba7a6/universes").await?;
//! # let _ = universes;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::Result;

/// Header carrying the API token on every request.
pub const AUTH_TOKEN_HEADER: &str = "X-AUTH-YW-API-TOKEN";

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one control-plane instance, scoped to one customer.
#[derive(Debug, Clone)]
pub struct YbaClient {
    http: reqwest::Client,
    base_url: String,
    customer_id: String,
}

impl YbaClient {
    /// Start building a client.
    pub fn builder() -> YbaClientBuilder {
        YbaClientBuilder::new()
    }

    /// The customer (tenant) this client operates on behalf of.
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Build a customer-scoped endpoint path.
    pub(crate) fn customer_path(&self, suffix: &str) -> String {
        format!("/api/v1/customers/{}/{}", self.customer_id, suffix)
    }

    /// Issue a `GET` and parse the JSON response.
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::GET, endpoint, None, &[], None).await
    }

    /// Issue a `GET` with query parameters and parse the JSON response.
    pub async fn get_with_query(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.request(Method::GET, endpoint, None, query, None).await
    }

    /// Issue a `POST` with a JSON body and parse the JSON response.
    pub async fn post(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        self.request(Method::POST, endpoint, Some(payload), &[], None)
            .await
    }

    /// Issue a `PUT` with a JSON body and parse the JSON response.
    pub async fn put(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        self.request(Method::PUT, endpoint, Some(payload), &[], None)
            .await
    }

    /// Issue a `DELETE` and parse the JSON response.
    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::DELETE, endpoint, None, &[], None).await
    }

    /// Issue one request against the control plane.
    ///
    /// `timeout` overrides the client-wide request timeout; polling loops
    /// use a short override so a slow status endpoint cannot eat the wait
    /// budget.
    pub(crate) async fn request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
        query: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!(%method, endpoint, "issuing control-plane request");

        let mut request = self.http.request(method, &url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::api(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|_| {
            Error::protocol(
                "expected a JSON-formatted response",
                Value::String(text),
            )
        })
    }
}

/// Builder for [`YbaClient`].
///
/// Base URL, API token, and customer ID are mandatory; the rest default to
/// sensible values.
#[derive(Debug, Default)]
pub struct YbaClientBuilder {
    base_url: Option<String>,
    api_token: Option<String>,
    customer_id: Option<String>,
    request_timeout: Option<Duration>,
    verify_certificate: bool,
}

impl YbaClientBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            verify_certificate: true,
            ..Self::default()
        }
    }

    /// Base URL of the control-plane instance, e.g.
    /// `https://yba.example.com`. A trailing slash is tolerated.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// API token sent on every request.
    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Customer (tenant) ID the client is scoped to.
    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Override the per-request timeout (default 30s).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Whether to verify the certificate presented by the control plane.
    /// Defaults to `true`; disable only for instances with self-signed
    /// certificates.
    pub fn verify_certificate(mut self, verify: bool) -> Self {
        self.verify_certificate = verify;
        self
    }

    /// Build the client, validating the configuration.
    pub fn build(self) -> Result<YbaClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base URL is required".into()))?;
        let api_token = self
            .api_token
            .ok_or_else(|| Error::Config("API token is required".into()))?;
        let customer_id = self
            .customer_id
            .ok_or_else(|| Error::Config("customer ID is required".into()))?;

        Url::parse(&base_url)
            .map_err(|err| Error::Config(format!("invalid base URL `{base_url}`: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&api_token)
            .map_err(|_| Error::Config("API token contains invalid header characters".into()))?;
        token.set_sensitive(true);
        headers.insert(AUTH_TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .danger_accept_invalid_certs(!self.verify_certificate)
            .build()
            .map_err(|err| Error::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(YbaClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            customer_id,
        })
    }
}
