//! Cart store.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use sabzi::{
    cart::{Cart, QuantityChange},
    products::{Product, ProductId},
    storage::Storage,
};
use tracing::{debug, info, warn};

use crate::api::{ApiError, CartApi, CouponValidator};

/// Message shown when the server refuses a cart addition without saying why.
pub const ADD_FAILED_MESSAGE: &str = "Add failed";

/// Message shown when the server cart cannot be loaded.
pub const SYNC_FAILED_MESSAGE: &str = "Could not load your cart";

/// The customer's cart, persisted on every change and reconciled with the backend on demand.
pub struct CartStore {
    cart: Mutex<Cart>,
    storage: Arc<dyn Storage>,
    api: Arc<dyn CartApi>,
    coupons: Arc<dyn CouponValidator>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.cart.lock())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store holding the cart persisted in `storage`.
    pub fn new(
        storage: Arc<dyn Storage>,
        api: Arc<dyn CartApi>,
        coupons: Arc<dyn CouponValidator>,
    ) -> Self {
        let cart = Cart::hydrate(storage.as_ref());

        debug!(lines = cart.len(), "hydrated cart");

        Self {
            cart: Mutex::new(cart),
            storage,
            api,
            coupons,
        }
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.cart.lock().clone()
    }

    /// Adjust the quantity of `product` by `delta` without waiting for the backend.
    pub fn add_or_adjust(&self, product: &Product, delta: i64) -> QuantityChange {
        let mut cart = self.cart.lock();
        let change = cart.add_or_adjust(product, delta);

        self.commit(&cart);

        change
    }

    /// Drop the line for `product_id`.
    pub fn remove(&self, product_id: &ProductId) -> bool {
        let mut cart = self.cart.lock();
        let removed = cart.remove(product_id);

        self.commit(&cart);

        removed
    }

    /// Empty the cart, forget the coupon and delete the persisted snapshot.
    pub fn clear(&self) {
        self.cart.lock().clear();

        if let Err(error) = Cart::discard(self.storage.as_ref()) {
            warn!(%error, "failed to remove persisted cart");
        }
    }

    /// Replace the local lines with the backend's cart.
    ///
    /// An empty server cart empties the local one. A body of unexpected shape also empties it;
    /// an unreachable or refusing backend leaves the lines alone and records an error.
    pub async fn sync_with_server(&self) {
        let started_at = {
            let mut cart = self.cart.lock();
            cart.begin_request();
            cart.revision()
        };

        let result = self.api.fetch_cart().await;
        let mut cart = self.cart.lock();

        let items = match result {
            Ok(items) => items,
            Err(ApiError::Malformed(reason)) => {
                debug!(%reason, "server cart unreadable, treating as empty");
                Vec::new()
            }
            Err(error) => {
                warn!(%error, "cart sync failed");
                cart.fail_request(error.message().unwrap_or(SYNC_FAILED_MESSAGE));
                return;
            }
        };

        let local_changes = cart.changes_since(started_at);

        if local_changes > 0 {
            warn!(local_changes, "server cart overwrites changes made while syncing");
        }

        cart.replace_items(items);
        cart.finish_request();

        info!(lines = cart.len(), "cart replaced from server");

        self.commit(&cart);
    }

    /// Tell the backend about a local addition.
    ///
    /// The local cart is never rolled back; a failure only records an error message.
    pub async fn push_add(&self, product: &Product, quantity: u32) {
        self.cart.lock().begin_request();

        let result = self.api.add_item(product.id.clone(), quantity).await;
        let mut cart = self.cart.lock();

        match result {
            Ok(()) => cart.finish_request(),
            Err(error) => {
                warn!(%error, product = %product.id, "server add failed");
                cart.fail_request(error.message().unwrap_or(ADD_FAILED_MESSAGE));
            }
        }
    }

    /// Validate `code` against `subtotal` and record the outcome on the cart.
    pub async fn apply_coupon(&self, code: &str, subtotal: Decimal) {
        let result = self.coupons.validate(code, subtotal).await;
        let mut cart = self.cart.lock();

        match result {
            Ok(coupon) => {
                info!(code = %coupon.code, discount = %coupon.discount_amount, "coupon applied");
                cart.apply_coupon(coupon);
            }
            Err(error) => {
                debug!(%error, code, "coupon refused");
                cart.reject_coupon(&error);
            }
        }
    }

    /// Forget the applied coupon.
    pub fn remove_coupon(&self) {
        self.cart.lock().remove_coupon();
    }

    fn commit(&self, cart: &Cart) {
        if let Err(error) = cart.persist(self.storage.as_ref()) {
            warn!(%error, "failed to persist cart");
        }
    }
}
