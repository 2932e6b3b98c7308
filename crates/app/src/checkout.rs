//! Checkout orchestration.
//!
//! Builds an order from the cart, delivery and address state and submits it. Only a placed
//! order clears the cart.

use std::sync::Arc;

use sabzi::checkout::{Address, OrderRequest, OrderRequestError, PaymentMethod, preferred_address};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{AddressesApi, ApiError, OrdersApi, Placement},
    stores::{CartStore, DeliveryStore},
};

/// Message shown when the order fails without a reason from the backend.
pub const ORDER_FAILED_MESSAGE: &str = "Order Failed";

/// Result of a checkout attempt the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order exists and the cart has been cleared.
    Placed {
        /// Backend order id
        order_id: String,
    },

    /// Phone verification is needed; the cart is untouched.
    VerificationRequired,
}

/// Errors raised by checkout. The cart and coupon are left as they were.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order could not be built from local state.
    #[error(transparent)]
    Invalid(#[from] OrderRequestError),

    /// The backend did not accept the order.
    #[error("{message}")]
    Failed {
        /// Message for the customer.
        message: String,

        /// Underlying backend error.
        #[source]
        source: ApiError,
    },
}

/// Coordinates the cart, delivery and order endpoints to place an order.
pub struct CheckoutOrchestrator {
    cart: Arc<CartStore>,
    delivery: Arc<DeliveryStore>,
    orders: Arc<dyn OrdersApi>,
    addresses: Arc<dyn AddressesApi>,
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("cart", &self.cart)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    /// Create an orchestrator over the given stores and endpoints.
    pub fn new(
        cart: Arc<CartStore>,
        delivery: Arc<DeliveryStore>,
        orders: Arc<dyn OrdersApi>,
        addresses: Arc<dyn AddressesApi>,
    ) -> Self {
        Self {
            cart,
            delivery,
            orders,
            addresses,
        }
    }

    /// The customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the addresses cannot be fetched.
    pub async fn saved_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.addresses.list_addresses().await
    }

    /// The address to preselect, if the customer has any saved.
    ///
    /// A failed fetch is logged and treated as having none.
    pub async fn default_address(&self) -> Option<Address> {
        match self.saved_addresses().await {
            Ok(addresses) => preferred_address(&addresses).cloned(),
            Err(error) => {
                warn!(%error, "address fetch failed");
                None
            }
        }
    }

    /// Place an order for the current cart.
    ///
    /// Unit prices are taken from the cart at the moment of submission. A placed order clears
    /// the whole cart, including lines changed while the request was in flight.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Invalid`]: the cart, address or delivery check is not ready.
    /// - [`CheckoutError::Failed`]: the backend refused the order or could not be reached.
    pub async fn place_order(
        &self,
        address: &Address,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let cart = self.cart.snapshot();
        let request =
            OrderRequest::from_cart(&cart, &self.delivery.snapshot(), address, payment_method)?;

        let total = request.total_price;

        match self.orders.place_order(request).await {
            Ok(Placement::Placed { order_id }) => {
                info!(%order_id, %total, %payment_method, "order placed");

                let local_changes = self.cart.snapshot().changes_since(cart.revision());

                if local_changes > 0 {
                    warn!(
                        %order_id,
                        local_changes,
                        "clearing cart changes made while the order was being placed"
                    );
                }

                self.cart.clear();

                Ok(CheckoutOutcome::Placed { order_id })
            }
            Ok(Placement::VerificationRequired) => {
                info!("order needs phone verification");

                Ok(CheckoutOutcome::VerificationRequired)
            }
            Err(source) => {
                warn!(error = %source, "order placement failed");

                Err(CheckoutError::Failed {
                    message: source.message().unwrap_or(ORDER_FAILED_MESSAGE).to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sabzi::{
        coupons::Coupon,
        delivery::ServiceabilityCheck,
        products::{Product, ProductId},
        storage::MemoryStorage,
    };
    use testresult::TestResult;

    use crate::api::{
        MockAddressesApi, MockCartApi, MockCouponValidator, MockDeliveryApi, MockOrdersApi,
    };

    use super::*;

    fn mango() -> Product {
        let mut product = Product::new(1_u64, "Alphonso Mango");
        product.prices.base_price = Some(Decimal::from(100));

        product
    }

    fn cart_store() -> Arc<CartStore> {
        let mut coupons = MockCouponValidator::new();

        coupons.expect_validate().returning(|code, _| {
            Ok(Coupon {
                code: code.to_string(),
                discount_amount: Decimal::from(49),
            })
        });

        Arc::new(CartStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MockCartApi::new()),
            Arc::new(coupons),
        ))
    }

    async fn serviceable_store() -> Arc<DeliveryStore> {
        let mut api = MockDeliveryApi::new();

        api.expect_check_delivery().returning(|_| {
            Ok(ServiceabilityCheck::Serviceable {
                city: Some("Mumbai".to_string()),
                delivery_time_hrs: Some(8),
                debug_log: None,
            })
        });

        let store = Arc::new(DeliveryStore::new(Arc::new(MemoryStorage::new()), Arc::new(api)));
        store.check_serviceability("400001").await;

        store
    }

    fn orchestrator(
        cart: &Arc<CartStore>,
        delivery: &Arc<DeliveryStore>,
        orders: MockOrdersApi,
        addresses: MockAddressesApi,
    ) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            Arc::clone(cart),
            Arc::clone(delivery),
            Arc::new(orders),
            Arc::new(addresses),
        )
    }

    fn address() -> Address {
        Address::new("Meera", "14 Carter Road")
    }

    #[tokio::test]
    async fn placed_order_clears_cart() -> TestResult {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut orders = MockOrdersApi::new();

        cart.add_or_adjust(&mango(), 3);
        cart.apply_coupon("FREEDEL", Decimal::from(300)).await;

        orders
            .expect_place_order()
            .withf(|request| {
                request.total_price == Decimal::from(256)
                    && request.coupon_code.as_deref() == Some("FREEDEL")
                    && request.delivery_city == "Mumbai"
                    && request.delivery_zip_code == "400001"
                    && request.items.len() == 1
                    && request.items.first().map(|line| (&line.product_id, line.quantity, line.price))
                        == Some((&ProductId::from(1_u64), 3, Decimal::from(100)))
            })
            .once()
            .return_once(|_| {
                Ok(Placement::Placed {
                    order_id: "ORD-77".to_string(),
                })
            });

        let outcome = orchestrator(&cart, &delivery, orders, MockAddressesApi::new())
            .place_order(&address(), PaymentMethod::Cod)
            .await?;

        assert_eq!(
            outcome,
            CheckoutOutcome::Placed {
                order_id: "ORD-77".to_string()
            }
        );
        assert!(cart.snapshot().is_empty());
        assert_eq!(cart.snapshot().coupon(), None);

        Ok(())
    }

    #[tokio::test]
    async fn verification_keeps_cart() -> TestResult {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut orders = MockOrdersApi::new();

        cart.add_or_adjust(&mango(), 1);

        orders
            .expect_place_order()
            .once()
            .return_once(|_| Ok(Placement::VerificationRequired));

        let outcome = orchestrator(&cart, &delivery, orders, MockAddressesApi::new())
            .place_order(&address(), PaymentMethod::Cod)
            .await?;

        assert_eq!(outcome, CheckoutOutcome::VerificationRequired);
        assert_eq!(cart.snapshot().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn failure_keeps_cart_and_coupon() {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut orders = MockOrdersApi::new();

        cart.add_or_adjust(&mango(), 1);
        cart.apply_coupon("FREEDEL", Decimal::from(100)).await;

        orders.expect_place_order().once().return_once(|_| {
            Err(ApiError::Rejected {
                status: 500,
                message: None,
            })
        });

        let result = orchestrator(&cart, &delivery, orders, MockAddressesApi::new())
            .place_order(&address(), PaymentMethod::Upi)
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Failed { ref message, .. }) if message == ORDER_FAILED_MESSAGE
        ));
        assert_eq!(cart.snapshot().len(), 1);
        assert_eq!(cart.snapshot().coupon_code(), Some("FREEDEL"));
    }

    #[tokio::test]
    async fn unchecked_delivery_is_refused_locally() {
        let cart = cart_store();
        let delivery = Arc::new(DeliveryStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MockDeliveryApi::new()),
        ));
        let mut orders = MockOrdersApi::new();

        cart.add_or_adjust(&mango(), 1);
        orders.expect_place_order().never();

        let result = orchestrator(&cart, &delivery, orders, MockAddressesApi::new())
            .place_order(&address(), PaymentMethod::Cod)
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Invalid(OrderRequestError::NotServiceable))
        ));
    }

    #[tokio::test]
    async fn zip_changed_after_check_is_refused() {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut orders = MockOrdersApi::new();

        cart.add_or_adjust(&mango(), 1);
        delivery.set_zip_code("999999");
        orders.expect_place_order().never();

        let result = orchestrator(&cart, &delivery, orders, MockAddressesApi::new())
            .place_order(&address(), PaymentMethod::Cod)
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Invalid(OrderRequestError::NotServiceable))
        ));
        assert_eq!(cart.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn changes_during_placement_are_cleared() -> TestResult {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut orders = MockOrdersApi::new();
        let during = Arc::clone(&cart);

        cart.add_or_adjust(&mango(), 1);

        orders.expect_place_order().once().return_once(move |request| {
            let mut papaya = Product::new(2_u64, "Papaya");
            papaya.prices.base_price = Some(Decimal::from(60));
            during.add_or_adjust(&papaya, 2);

            assert_eq!(request.items.len(), 1);

            Ok(Placement::Placed {
                order_id: "ORD-78".to_string(),
            })
        });

        let before = cart.snapshot().revision();

        let outcome = orchestrator(&cart, &delivery, orders, MockAddressesApi::new())
            .place_order(&address(), PaymentMethod::Cod)
            .await?;

        assert!(matches!(outcome, CheckoutOutcome::Placed { .. }));
        assert!(cart.snapshot().is_empty());
        assert!(cart.snapshot().changes_since(before) >= 2);

        Ok(())
    }

    #[tokio::test]
    async fn default_address_prefers_flagged_one() {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut addresses = MockAddressesApi::new();

        addresses.expect_list_addresses().once().return_once(|| {
            let mut office = Address::new("Meera", "Office");
            office.is_default = true;

            Ok(vec![Address::new("Meera", "Home"), office])
        });

        let chosen = orchestrator(&cart, &delivery, MockOrdersApi::new(), addresses)
            .default_address()
            .await;

        assert_eq!(chosen.map(|address| address.street), Some("Office".to_string()));
    }

    #[tokio::test]
    async fn address_failure_means_no_default() {
        let cart = cart_store();
        let delivery = serviceable_store().await;
        let mut addresses = MockAddressesApi::new();

        addresses
            .expect_list_addresses()
            .once()
            .return_once(|| Err(ApiError::Transport("offline".to_string())));

        let chosen = orchestrator(&cart, &delivery, MockOrdersApi::new(), addresses)
            .default_address()
            .await;

        assert_eq!(chosen, None);
    }
}
