//! Coupon validation.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use sabzi::coupons::{Coupon, CouponError, CouponRules, normalize_code};
use serde_json::json;
use tracing::debug;

use super::{ApiError, HttpBackend};

/// Message used when the backend refuses a code without saying why.
const INVALID_COUPON_FALLBACK: &str = "Invalid Coupon";

/// Decides whether a coupon code applies to a subtotal.
#[automock]
#[async_trait]
pub trait CouponValidator: Send + Sync {
    /// Validate `code` against `subtotal`.
    async fn validate(&self, code: &str, subtotal: Decimal) -> Result<Coupon, CouponError>;
}

/// Validates codes against a client-side rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTableValidator {
    rules: CouponRules,
}

impl RuleTableValidator {
    /// Create a validator over `rules`.
    pub fn new(rules: CouponRules) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl CouponValidator for RuleTableValidator {
    async fn validate(&self, code: &str, subtotal: Decimal) -> Result<Coupon, CouponError> {
        self.rules.validate(code, subtotal)
    }
}

#[async_trait]
impl CouponValidator for HttpBackend {
    async fn validate(&self, code: &str, subtotal: Decimal) -> Result<Coupon, CouponError> {
        let code = normalize_code(code);
        let body = json!({ "code": code, "order_total": subtotal });

        debug!(%code, %subtotal, "validating coupon with backend");

        let reply = self
            .send(self.post("coupons/apply/", &body))
            .await
            .map_err(|error| CouponError::Unavailable(error.to_string()))?;

        let body = reply.into_body(&["error"]).map_err(|error| match error {
            ApiError::Rejected { message, .. } => CouponError::Rejected(
                message.unwrap_or_else(|| INVALID_COUPON_FALLBACK.to_string()),
            ),
            other => CouponError::Unavailable(other.to_string()),
        })?;

        serde_json::from_value(body).map_err(|error| CouponError::Unavailable(error.to_string()))
    }
}
