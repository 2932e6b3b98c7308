//! Order history store.

use std::sync::Arc;

use parking_lot::Mutex;
use sabzi::orders::Order;
use tracing::warn;

use crate::api::OrdersApi;

/// Message shown when order history cannot be loaded.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch orders";

#[derive(Debug, Default)]
struct OrdersState {
    orders: Vec<Order>,
    active_order: Option<Order>,
    is_loading: bool,
    error: Option<String>,
}

/// The customer's past orders and the one being viewed.
pub struct OrdersStore {
    state: Mutex<OrdersState>,
    api: Arc<dyn OrdersApi>,
}

impl std::fmt::Debug for OrdersStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersStore")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl OrdersStore {
    /// Create an empty store.
    pub fn new(api: Arc<dyn OrdersApi>) -> Self {
        Self {
            state: Mutex::new(OrdersState::default()),
            api,
        }
    }

    /// Load the order history.
    pub async fn fetch_orders(&self) {
        self.begin();

        let result = self.api.list_orders().await;
        let mut state = self.state.lock();

        state.is_loading = false;

        match result {
            Ok(orders) => state.orders = orders,
            Err(error) => {
                warn!(%error, "order history fetch failed");
                state.error = Some(error.message().unwrap_or(FETCH_FAILED_MESSAGE).to_string());
            }
        }
    }

    /// Load one order as the active order.
    pub async fn fetch_order_details(&self, order_id: &str) {
        self.begin();
        self.state.lock().active_order = None;

        let result = self.api.order_details(order_id.to_string()).await;
        let mut state = self.state.lock();

        state.is_loading = false;

        match result {
            Ok(order) => state.active_order = Some(order),
            Err(error) => {
                warn!(%error, order_id, "order fetch failed");
                state.error = Some(error.message().unwrap_or(FETCH_FAILED_MESSAGE).to_string());
            }
        }
    }

    /// Orders from the last successful fetch.
    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().orders.clone()
    }

    /// Order loaded by [`OrdersStore::fetch_order_details`].
    pub fn active_order(&self) -> Option<Order> {
        self.state.lock().active_order.clone()
    }

    /// Stop viewing the active order.
    pub fn clear_active_order(&self) {
        self.state.lock().active_order = None;
    }

    /// Message from the last failed fetch.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.is_loading = true;
        state.error = None;
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use sabzi::orders::OrderStatus;
    use serde_json::json;
    use testresult::TestResult;

    use crate::api::{ApiError, MockOrdersApi};

    use super::*;

    fn order(id: &str) -> Result<Order, serde_json::Error> {
        serde_json::from_value(json!({
            "id": id,
            "total_price": "120.00",
            "status": "DELIVERED",
        }))
    }

    #[tokio::test]
    async fn lists_orders() -> TestResult {
        let orders = vec![order("ORD-1")?, order("ORD-2")?];
        let mut api = MockOrdersApi::new();

        api.expect_list_orders().once().return_once(move || Ok(orders));

        let store = OrdersStore::new(Arc::new(api));
        store.fetch_orders().await;

        assert_eq!(store.orders().len(), 2);
        assert_eq!(store.error(), None);

        Ok(())
    }

    #[tokio::test]
    async fn failed_list_keeps_generic_message() {
        let mut api = MockOrdersApi::new();

        api.expect_list_orders()
            .once()
            .return_once(|| Err(ApiError::Transport("reset".to_string())));

        let store = OrdersStore::new(Arc::new(api));
        store.fetch_orders().await;

        assert_eq!(store.error().as_deref(), Some(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn loads_active_order() -> TestResult {
        let details = order("ORD-9")?;
        let mut api = MockOrdersApi::new();

        api.expect_order_details()
            .with(eq("ORD-9".to_string()))
            .once()
            .return_once(move |_| Ok(details));

        let store = OrdersStore::new(Arc::new(api));
        store.fetch_order_details("ORD-9").await;

        let active = store.active_order().ok_or("no active order")?;

        assert_eq!(active.display_status(), OrderStatus::Delivered);

        store.clear_active_order();

        assert!(store.active_order().is_none());

        Ok(())
    }
}
