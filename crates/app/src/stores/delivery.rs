//! Delivery store.

use std::sync::Arc;

use parking_lot::Mutex;
use sabzi::{
    delivery::DeliveryState,
    storage::{LAST_ZIP_KEY, Storage},
};
use tracing::{debug, info, warn};

use crate::api::DeliveryApi;

/// Postal code serviceability for the session.
pub struct DeliveryStore {
    state: Mutex<DeliveryState>,
    storage: Arc<dyn Storage>,
    api: Arc<dyn DeliveryApi>,
}

impl std::fmt::Debug for DeliveryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryStore")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl DeliveryStore {
    /// Create a store remembering the last postal code saved in `storage`.
    ///
    /// Serviceability always starts unknown, even when a postal code is remembered.
    pub fn new(storage: Arc<dyn Storage>, api: Arc<dyn DeliveryApi>) -> Self {
        let zip_code = storage.get(LAST_ZIP_KEY).unwrap_or_else(|error| {
            warn!(%error, "could not read last postal code");
            None
        });

        Self {
            state: Mutex::new(DeliveryState::with_zip_code(zip_code)),
            storage,
            api,
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DeliveryState {
        self.state.lock().clone()
    }

    /// Remember `zip_code` without checking it.
    pub fn set_zip_code(&self, zip_code: &str) {
        self.state.lock().set_zip_code(zip_code);

        if let Err(error) = self.storage.set(LAST_ZIP_KEY, zip_code) {
            warn!(%error, "failed to persist postal code");
        }
    }

    /// Ask the backend whether `zip_code` is served and record the answer.
    pub async fn check_serviceability(&self, zip_code: &str) {
        let zip_code = zip_code.trim();

        self.set_zip_code(zip_code);
        self.state.lock().begin_check();

        debug!(zip_code, "checking serviceability");

        let result = self.api.check_delivery(zip_code).await;
        let mut state = self.state.lock();

        match result {
            Ok(check) => {
                state.record_check(check);
                info!(
                    zip_code,
                    serviceability = ?state.serviceability(),
                    city = state.city(),
                    "serviceability checked"
                );
            }
            Err(error) => {
                warn!(%error, zip_code, "serviceability check failed");
                state.record_failure(error.message().map(ToString::to_string));
            }
        }
    }

    /// Forget the postal code and any check result.
    pub fn reset(&self) {
        self.state.lock().reset();

        if let Err(error) = self.storage.remove(LAST_ZIP_KEY) {
            warn!(%error, "failed to remove persisted postal code");
        }
    }
}
