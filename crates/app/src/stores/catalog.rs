//! Catalog store.

use std::sync::Arc;

use parking_lot::Mutex;
use sabzi::products::Product;
use tracing::{debug, info, warn};

use crate::api::{ApiError, CatalogApi, CatalogSource};

/// Message shown when neither catalog returned a product list.
pub const INVALID_FORMAT_MESSAGE: &str = "Backend returned invalid data format";

/// Message shown when the backend could not be reached.
pub const UNREACHABLE_MESSAGE: &str = "Connection Error: Check if Backend is Awake";

#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<Product>,
    is_loading: bool,
    error: Option<String>,
}

/// Products available to the storefront.
pub struct CatalogStore {
    state: Mutex<CatalogState>,
    api: Arc<dyn CatalogApi>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Create an empty store.
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            state: Mutex::new(CatalogState::default()),
            api,
        }
    }

    /// Load the catalog.
    ///
    /// The canonical catalog is tried first; when it fails or is empty the legacy catalog is
    /// used instead. Only a failure of the legacy catalog is recorded as an error.
    pub async fn fetch_products(&self) {
        {
            let mut state = self.state.lock();
            state.is_loading = true;
            state.error = None;
        }

        let result = self.load().await;
        let mut state = self.state.lock();

        state.is_loading = false;

        match result {
            Ok(products) => {
                info!(count = products.len(), "catalog loaded");
                state.products = products;
            }
            Err(error) => {
                warn!(%error, "catalog fetch failed");
                state.error = Some(match error {
                    ApiError::Malformed(_) => INVALID_FORMAT_MESSAGE.to_string(),
                    other => other.message().unwrap_or(UNREACHABLE_MESSAGE).to_string(),
                });
            }
        }
    }

    /// Products from the last successful fetch.
    pub fn products(&self) -> Vec<Product> {
        self.state.lock().products.clone()
    }

    /// Product whose id or slug is `key`.
    pub fn find(&self, key: &str) -> Option<Product> {
        self.state
            .lock()
            .products
            .iter()
            .find(|product| product.matches(key))
            .cloned()
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    /// Message from the last failed fetch.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    async fn load(&self) -> Result<Vec<Product>, ApiError> {
        match self.api.fetch_products(CatalogSource::Canonical).await {
            Ok(products) if !products.is_empty() => return Ok(products),
            Ok(_) => debug!("canonical catalog empty, trying legacy catalog"),
            Err(error) => debug!(%error, "canonical catalog failed, trying legacy catalog"),
        }

        self.api.fetch_products(CatalogSource::Legacy).await
    }
}
