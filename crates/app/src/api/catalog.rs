//! Catalog endpoints.

use async_trait::async_trait;
use mockall::automock;
use sabzi::{
    payload::{DATA_ENVELOPE_KEYS, list_from_envelope, parse_entries},
    products::Product,
};
use tracing::debug;

use super::{ApiError, HttpBackend};

/// Which catalog endpoint to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// The storefront's own product table.
    Canonical,

    /// The older catalog, proxied through the backend.
    Legacy,
}

impl CatalogSource {
    /// Endpoint path, relative to the API base.
    pub fn path(self) -> &'static str {
        match self {
            CatalogSource::Canonical => "v2/products/",
            CatalogSource::Legacy => "proxy/products/",
        }
    }
}

/// Read access to the product catalog.
#[automock]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch every product from `source`, normalized.
    ///
    /// Returns [`ApiError::Malformed`] when the body is neither a product list nor a
    /// `{success, data}` envelope holding one.
    async fn fetch_products(&self, source: CatalogSource) -> Result<Vec<Product>, ApiError>;
}

#[async_trait]
impl CatalogApi for HttpBackend {
    async fn fetch_products(&self, source: CatalogSource) -> Result<Vec<Product>, ApiError> {
        debug!(path = source.path(), "fetching catalog");

        let request = self.get(source.path()).timeout(self.timeout_for(source));
        let body = self.send(request).await?.into_body(&["message"])?;

        let entries = list_from_envelope(body, DATA_ENVELOPE_KEYS).ok_or_else(|| {
            ApiError::Malformed(format!("{} did not return a product list", source.path()))
        })?;

        Ok(parse_entries(entries))
    }
}
