//! Delivery serviceability endpoint.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sabzi::{delivery::ServiceabilityCheck, payload::message_from};
use serde_json::{Value, json};

use super::{ApiError, HttpBackend};

/// Message used when the backend refuses a code without saying why.
const REFUSED_FALLBACK: &str = "Not Serviceable";

/// The backend's postal code serviceability oracle.
#[automock]
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Ask whether `zip_code` is served.
    ///
    /// A structured refusal is an `Ok` [`ServiceabilityCheck::NotServiceable`]; an error status
    /// is an [`ApiError::Rejected`].
    async fn check_delivery(&self, zip_code: &str) -> Result<ServiceabilityCheck, ApiError>;
}

#[async_trait]
impl DeliveryApi for HttpBackend {
    async fn check_delivery(&self, zip_code: &str) -> Result<ServiceabilityCheck, ApiError> {
        let reply = self
            .send(self.post("check-delivery/", &json!({ "zip_code": zip_code })))
            .await?;

        let succeeded = reply.succeeded();
        let body = reply.into_body(&["user_msg"])?;

        Ok(check_from_body(&body, succeeded))
    }
}

fn check_from_body(body: &Value, succeeded: bool) -> ServiceabilityCheck {
    let debug_log = body
        .get("debug_log")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    if !succeeded {
        return ServiceabilityCheck::NotServiceable {
            message: Some(
                message_from(body, &["user_msg"]).unwrap_or_else(|| REFUSED_FALLBACK.to_string()),
            ),
            debug_log,
        };
    }

    let data = body.get("data");
    let is_serviceable = data
        .and_then(|data| data.get("is_serviceable"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if is_serviceable {
        ServiceabilityCheck::Serviceable {
            city: data
                .and_then(|data| data.get("city"))
                .and_then(Value::as_str)
                .map(ToString::to_string),
            delivery_time_hrs: data
                .and_then(|data| data.get("delivery_time_hrs"))
                .and_then(whole_hours),
            debug_log,
        }
    } else {
        ServiceabilityCheck::NotServiceable {
            message: None,
            debug_log,
        }
    }
}

/// Accepts `6`, `6.0` and `"6"`; anything fractional, negative or unparseable is dropped.
fn whole_hours(value: &Value) -> Option<u32> {
    let hours = match value {
        Value::Number(number) => number.to_string().parse::<Decimal>().ok()?,
        Value::String(text) => text.trim().parse::<Decimal>().ok()?,
        _ => return None,
    };

    if hours.fract().is_zero() {
        hours.to_u32()
    } else {
        None
    }
}
