//! Order endpoints.

use async_trait::async_trait;
use mockall::automock;
use reqwest::StatusCode;
use sabzi::{
    checkout::OrderRequest,
    orders::Order,
    payload::{DATA_ENVELOPE_KEYS, parse_list},
};
use serde_json::Value;
use tracing::debug;

use super::{ApiError, HttpBackend, Reply};

/// Action the backend names when the customer must verify their phone first.
const VERIFY_OTP_ACTION: &str = "VERIFY_OTP";

/// Order id shown when the backend confirms an order without returning its id.
const UNKNOWN_ORDER_ID: &str = "ORD-NEW";

/// What happened to a placement request the backend accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The order exists.
    Placed {
        /// Backend order id
        order_id: String,
    },

    /// The customer must complete phone verification before the order is accepted.
    VerificationRequired,
}

/// Order placement and history.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Submit `request`.
    async fn place_order(&self, request: OrderRequest) -> Result<Placement, ApiError>;

    /// The customer's past orders, newest first as the backend sends them.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// A single order.
    async fn order_details(&self, order_id: String) -> Result<Order, ApiError>;
}

#[async_trait]
impl OrdersApi for HttpBackend {
    async fn place_order(&self, request: OrderRequest) -> Result<Placement, ApiError> {
        debug!(lines = request.items.len(), total = %request.total_price, "placing order");

        let reply = self.send(self.post("orders/place/", &request)).await?;

        placement_from_reply(reply)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let body = self.send(self.get("orders/")).await?.into_body(&["detail"])?;

        Ok(parse_list(body, DATA_ENVELOPE_KEYS))
    }

    async fn order_details(&self, order_id: String) -> Result<Order, ApiError> {
        let body = self
            .send(self.get(&format!("orders/{order_id}/")))
            .await?
            .into_body(&["detail"])?;

        let order = match body {
            Value::Object(mut object) if object.contains_key("data") => {
                object.remove("data").unwrap_or_default()
            }
            other => other,
        };

        serde_json::from_value(order).map_err(|error| ApiError::Malformed(error.to_string()))
    }
}

fn placement_from_reply(reply: Reply) -> Result<Placement, ApiError> {
    if reply.body.get("action_required").and_then(Value::as_str) == Some(VERIFY_OTP_ACTION)
        || reply.status == StatusCode::FORBIDDEN
    {
        return Ok(Placement::VerificationRequired);
    }

    if !reply.status.is_success() || !reply.succeeded() {
        return Err(reply.rejection(&["user_msg", "error"]));
    }

    let order_id = match reply.body.pointer("/data/order_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => UNKNOWN_ORDER_ID.to_string(),
    };

    Ok(Placement::Placed { order_id })
}
