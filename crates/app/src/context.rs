//! App Context

use std::sync::Arc;

use sabzi::{coupons::CouponRules, storage::StorageError};
use thiserror::Error;

use crate::{
    api::{CouponValidator, HttpBackend, RuleTableValidator},
    checkout::CheckoutOrchestrator,
    config::AppConfig,
    storage::FileStorage,
    stores::{CartStore, CatalogStore, DeliveryStore, OrdersStore},
};

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The local state file could not be opened.
    #[error("failed to open local state")]
    Storage(#[source] StorageError),
}

/// Every store, wired to the configured backend and local state.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Product catalog
    pub catalog: Arc<CatalogStore>,

    /// Customer cart
    pub cart: Arc<CartStore>,

    /// Postal code serviceability
    pub delivery: Arc<DeliveryStore>,

    /// Order history
    pub orders: Arc<OrdersStore>,

    /// Order placement
    pub checkout: Arc<CheckoutOrchestrator>,

    /// Origin for root-relative image paths
    pub asset_origin: String,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the local state file cannot be opened.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage =
            Arc::new(FileStorage::open(&config.state.state_dir).map_err(AppInitError::Storage)?);

        let backend = Arc::new(HttpBackend::new(config.api.backend()));

        let coupons: Arc<dyn CouponValidator> = if config.api.server_coupons {
            backend.clone()
        } else {
            Arc::new(RuleTableValidator::new(CouponRules::default()))
        };

        let cart = Arc::new(CartStore::new(storage.clone(), backend.clone(), coupons));
        let delivery = Arc::new(DeliveryStore::new(storage, backend.clone()));

        let checkout = Arc::new(CheckoutOrchestrator::new(
            Arc::clone(&cart),
            Arc::clone(&delivery),
            backend.clone(),
            backend.clone(),
        ));

        Ok(Self {
            catalog: Arc::new(CatalogStore::new(backend.clone())),
            orders: Arc::new(OrdersStore::new(backend)),
            cart,
            delivery,
            checkout,
            asset_origin: config.api.asset_origin(),
        })
    }
}
