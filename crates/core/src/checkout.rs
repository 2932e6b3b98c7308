//! Checkout
//!
//! Fee schedule and construction of the order placement request. Prices are snapshotted from
//! the cart when the request is built, so a placed order never re-resolves them later.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::Cart, delivery::DeliveryState, pricing::resolve_price, products::ProductId};

/// Subtotal above which delivery is free.
pub const FREE_DELIVERY_THRESHOLD: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Delivery fee charged at or below [`FREE_DELIVERY_THRESHOLD`].
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Flat handling fee on every order.
pub const HANDLING_FEE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Reasons an order request cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRequestError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The delivery address is missing a name or street.
    #[error("delivery address needs a name and street")]
    IncompleteAddress,

    /// The delivery postal code has not been confirmed as serviceable.
    #[error("delivery is not available for the selected postal code")]
    NotServiceable,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,

    /// UPI transfer.
    Upi,

    /// Store wallet balance.
    Wallet,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Wallet => "WALLET",
        })
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "COD" => Ok(PaymentMethod::Cod),
            "UPI" => Ok(PaymentMethod::Upi),
            "WALLET" => Ok(PaymentMethod::Wallet),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Recipient name.
    #[serde(default)]
    pub name: String,

    /// Street address.
    #[serde(default)]
    pub street: String,

    /// Whether this is the customer's default address.
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Create a non-default address.
    pub fn new(name: impl Into<String>, street: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            is_default: false,
        }
    }

    /// Whether both name and street are filled in.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.street.trim().is_empty()
    }
}

/// Pick the address to preselect: the first default one, else the first one.
pub fn preferred_address(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|address| address.is_default)
        .or_else(|| addresses.first())
}

/// Charges shown at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    /// Sum of line totals.
    pub subtotal: Decimal,

    /// Coupon discount.
    pub discount: Decimal,

    /// Delivery fee.
    pub delivery_fee: Decimal,

    /// Handling fee.
    pub handling_fee: Decimal,

    /// Amount due.
    pub grand_total: Decimal,
}

impl Charges {
    /// Charges for a subtotal and coupon discount.
    pub fn new(subtotal: Decimal, discount: Decimal) -> Self {
        let delivery_fee = if subtotal > FREE_DELIVERY_THRESHOLD {
            Decimal::ZERO
        } else {
            DELIVERY_FEE
        };

        let grand_total = subtotal
            .saturating_add(delivery_fee)
            .saturating_add(HANDLING_FEE)
            .saturating_sub(discount)
            .max(Decimal::ZERO);

        Self {
            subtotal,
            discount,
            delivery_fee,
            handling_fee: HANDLING_FEE,
            grand_total,
        }
    }

    /// Charges for the current state of `cart`.
    pub fn for_cart(cart: &Cart) -> Self {
        Self::new(cart.total_amount(), cart.discount_amount())
    }
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// Product ordered.
    pub product_id: ProductId,

    /// Units ordered.
    pub quantity: u32,

    /// Unit price at the time of ordering.
    pub price: Decimal,
}

/// Order placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Amount due, fees and discount included.
    pub total_price: Decimal,

    /// Payment method.
    pub payment_method: PaymentMethod,

    /// Recipient name.
    pub delivery_name: String,

    /// Street address.
    pub delivery_street: String,

    /// City, from the serviceability check.
    pub delivery_city: String,

    /// Postal code, from the serviceability check.
    pub delivery_zip_code: String,

    /// Applied coupon code.
    pub coupon_code: Option<String>,

    /// Ordered lines.
    pub items: Vec<OrderLine>,
}

impl OrderRequest {
    /// Build a request from the cart, the delivery check and the chosen address.
    ///
    /// # Errors
    ///
    /// - [`OrderRequestError::EmptyCart`]: the cart has no lines.
    /// - [`OrderRequestError::IncompleteAddress`]: `address` lacks a name or street.
    /// - [`OrderRequestError::NotServiceable`]: the postal code has not been confirmed.
    pub fn from_cart(
        cart: &Cart,
        delivery: &DeliveryState,
        address: &Address,
        payment_method: PaymentMethod,
    ) -> Result<Self, OrderRequestError> {
        if cart.is_empty() {
            return Err(OrderRequestError::EmptyCart);
        }

        if !address.is_complete() {
            return Err(OrderRequestError::IncompleteAddress);
        }

        let Some(zip_code) = delivery.zip_code().filter(|_| delivery.is_serviceable()) else {
            return Err(OrderRequestError::NotServiceable);
        };

        let items = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id.clone(),
                quantity: item.quantity,
                price: resolve_price(&item.product),
            })
            .collect();

        Ok(Self {
            total_price: Charges::for_cart(cart).grand_total,
            payment_method,
            delivery_name: address.name.trim().to_string(),
            delivery_street: address.street.trim().to_string(),
            delivery_city: delivery.city().unwrap_or_default().to_string(),
            delivery_zip_code: zip_code.to_string(),
            coupon_code: cart.coupon_code().map(ToString::to_string),
            items,
        })
    }
}
