//! Storefront backend.
//!
//! One trait per backend concern so stores can be tested against mocks. [`HttpBackend`]
//! implements all of them over the REST API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod delivery;
pub mod orders;

pub use addresses::{AddressesApi, MockAddressesApi};
pub use cart::{CartApi, MockCartApi};
pub use catalog::{CatalogApi, CatalogSource, MockCatalogApi};
pub use coupons::{CouponValidator, MockCouponValidator, RuleTableValidator};
pub use delivery::{DeliveryApi, MockDeliveryApi};
pub use orders::{MockOrdersApi, OrdersApi, Placement};

/// Errors raised by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered but refused the request.
    #[error("backend rejected the request ({status})")]
    Rejected {
        /// HTTP status code.
        status: u16,

        /// Message from the response body, if one was found.
        message: Option<String>,
    },

    /// The backend answered with a body of an unexpected shape.
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Server-supplied message, when the backend sent one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            ApiError::Transport(_) | ApiError::Malformed(_) => None,
        }
    }

    /// HTTP status of a rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Malformed(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Transport(error.to_string())
    }
}

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API base URL, e.g. `"http://localhost:8000/api/"`.
    pub base_url: String,

    /// Bearer token for authenticated endpoints.
    pub token: Option<String>,

    /// Timeout for the canonical catalog endpoint.
    pub catalog_timeout: Duration,

    /// Timeout for the legacy proxied catalog endpoint.
    pub legacy_catalog_timeout: Duration,
}

/// HTTP client for the storefront REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    http: Client,
}

/// Status and decoded body of a backend response.
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) body: Value,
}

impl Reply {
    /// Whether the body carries `"success": true`.
    pub(crate) fn succeeded(&self) -> bool {
        self.body.get("success").and_then(Value::as_bool) == Some(true)
    }

    /// Whether the body carries `"success": false`.
    pub(crate) fn refused(&self) -> bool {
        self.body.get("success").and_then(Value::as_bool) == Some(false)
    }

    /// Turn the reply into a rejection carrying the first message under `keys`.
    pub(crate) fn rejection(&self, keys: &[&str]) -> ApiError {
        ApiError::Rejected {
            status: self.status.as_u16(),
            message: sabzi::payload::message_from(&self.body, keys),
        }
    }

    /// The body of a 2xx reply, or a rejection carrying the first message under `keys`.
    pub(crate) fn into_body(self, keys: &[&str]) -> Result<Value, ApiError> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(self.rejection(keys))
        }
    }
}

impl HttpBackend {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str, body: &impl serde::Serialize) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)).json(body))
    }

    pub(crate) fn timeout_for(&self, source: CatalogSource) -> Duration {
        match source {
            CatalogSource::Canonical => self.config.catalog_timeout,
            CatalogSource::Legacy => self.config.legacy_catalog_timeout,
        }
    }

    /// Send `request` and decode the body, whatever the status.
    ///
    /// Bodies that are empty or not JSON decode to `null`.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Reply, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(%status, bytes = text.len(), "backend replied");

        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(Reply { status, body })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
