//! Orders
//!
//! Read-only views of placed orders, as returned by the order history endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::money::amount_from_value;

/// Order and delivery progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Received, not yet picked.
    #[default]
    Pending,

    /// Being packed.
    Packing,

    /// With a driver.
    OutForDelivery,

    /// Handed over.
    Delivered,

    /// Cancelled before delivery.
    Cancelled,
}

impl OrderStatus {
    /// Label shown to customers.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Packing => "Packing",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether the order can still change.
    pub fn is_open(self) -> bool {
        !matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// A line on a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderItem {
    /// Product name at the time of purchase.
    #[serde(default)]
    pub product_name: String,

    /// Units bought.
    #[serde(default)]
    pub quantity: u32,

    /// Unit price charged.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price_at_purchase: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    /// Order id
    #[serde(deserialize_with = "id_string")]
    pub id: String,

    /// Amount charged
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_price: Decimal,

    /// Order status
    #[serde(default)]
    pub status: OrderStatus,

    /// Delivery status, the one shown to customers
    #[serde(default)]
    pub delivery_status: Option<OrderStatus>,

    /// Ordered lines
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Creation timestamp, as sent by the backend
    #[serde(default)]
    pub created_at: String,

    /// Assigned driver
    #[serde(default)]
    pub driver_name: Option<String>,

    /// Driver contact number
    #[serde(default)]
    pub driver_phone: Option<String>,

    /// Whether this order belongs to a subscription
    #[serde(default)]
    pub is_subscription: bool,
}

impl Order {
    /// Status to show: the delivery status when present, else the order status.
    pub fn display_status(&self) -> OrderStatus {
        self.delivery_status.unwrap_or(self.status)
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;

    Ok(amount_from_value(&value).unwrap_or_default())
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid order id: {other}"))),
    }
}
