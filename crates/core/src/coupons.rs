//! Coupons

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::round_minor;

/// Message shown for a code no rule recognises.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid Coupon Code";

/// A coupon accepted for a given subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Normalized coupon code.
    #[serde(rename = "coupon")]
    pub code: String,

    /// Amount taken off the order.
    pub discount_amount: Decimal,
}

/// Reasons a coupon was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// No rule exists for the code.
    #[error("Invalid Coupon Code")]
    Unknown(String),

    /// The code exists but was refused; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Validation could not be reached.
    #[error("{0}")]
    Unavailable(String),
}

/// How a coupon computes its discount.
#[derive(Debug, Clone, Copy)]
pub enum CouponKind {
    /// A percentage of the subtotal, capped at an absolute amount.
    CappedPercentage {
        /// Fraction of the subtotal taken off.
        percent: Percentage,

        /// Largest discount granted.
        cap: Decimal,
    },

    /// A fixed amount, regardless of subtotal.
    Flat(Decimal),
}

impl CouponKind {
    /// Discount granted on `subtotal`.
    pub fn discount_on(&self, subtotal: Decimal) -> Decimal {
        match self {
            CouponKind::CappedPercentage { percent, cap } => {
                let discount = ((*percent) * Decimal::ONE)
                    .checked_mul(subtotal.max(Decimal::ZERO))
                    .unwrap_or(*cap);

                round_minor(discount.min(*cap))
            }
            CouponKind::Flat(amount) => *amount,
        }
    }
}

/// A single coupon code and its discount rule.
#[derive(Debug, Clone)]
pub struct CouponRule {
    /// Uppercase code.
    pub code: String,

    /// Discount rule.
    pub kind: CouponKind,
}

impl CouponRule {
    /// Create a rule; the code is stored uppercase.
    pub fn new(code: &str, kind: CouponKind) -> Self {
        Self {
            code: normalize_code(code),
            kind,
        }
    }
}

/// Client-side table of known coupon codes.
#[derive(Debug, Clone)]
pub struct CouponRules {
    rules: Vec<CouponRule>,
}

impl CouponRules {
    /// Create a table from `rules`.
    pub fn new(rules: impl Into<Vec<CouponRule>>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// Validate `code` against `subtotal`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Unknown`] when no rule matches the code.
    pub fn validate(&self, code: &str, subtotal: Decimal) -> Result<Coupon, CouponError> {
        let normalized = normalize_code(code);

        let rule = self
            .rules
            .iter()
            .find(|rule| rule.code == normalized)
            .ok_or_else(|| CouponError::Unknown(normalized.clone()))?;

        Ok(Coupon {
            discount_amount: rule.kind.discount_on(subtotal),
            code: rule.code.clone(),
        })
    }

    /// Known rules, in table order.
    pub fn rules(&self) -> &[CouponRule] {
        &self.rules
    }
}

impl Default for CouponRules {
    /// `WELCOME50` takes 50% off up to 150; `FREEDEL` takes a flat 49 off.
    fn default() -> Self {
        Self::new([
            CouponRule::new(
                "WELCOME50",
                CouponKind::CappedPercentage {
                    percent: Percentage::from(0.5),
                    cap: Decimal::from(150),
                },
            ),
            CouponRule::new("FREEDEL", CouponKind::Flat(Decimal::from(49))),
        ])
    }
}

/// Uppercase and trim a user-entered code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn welcome50_is_capped() -> TestResult {
        let coupon = CouponRules::default().validate("WELCOME50", Decimal::from(1000))?;

        assert_eq!(coupon.code, "WELCOME50");
        assert_eq!(coupon.discount_amount, Decimal::from(150));

        Ok(())
    }

    #[test]
    fn welcome50_below_cap_is_half() -> TestResult {
        let coupon = CouponRules::default().validate("WELCOME50", Decimal::from(100))?;

        assert_eq!(coupon.discount_amount, Decimal::from(50));

        Ok(())
    }

    #[test]
    fn freedel_is_flat() -> TestResult {
        let rules = CouponRules::default();

        for subtotal in [0, 10, 200, 5000] {
            let coupon = rules.validate("FREEDEL", Decimal::from(subtotal))?;

            assert_eq!(coupon.discount_amount, Decimal::from(49));
        }

        Ok(())
    }

    #[test]
    fn codes_are_case_insensitive() -> TestResult {
        let coupon = CouponRules::default().validate("  welcome50 ", Decimal::from(230))?;

        assert_eq!(coupon.code, "WELCOME50");
        assert_eq!(coupon.discount_amount, Decimal::from(115));

        Ok(())
    }

    #[test]
    fn unknown_code_is_rejected() {
        let result = CouponRules::default().validate("XYZ123", Decimal::from(500));

        assert_eq!(result, Err(CouponError::Unknown("XYZ123".to_string())));
        assert_eq!(
            result.map_err(|error| error.to_string()),
            Err(INVALID_COUPON_MESSAGE.to_string())
        );
    }

    #[test]
    fn percentage_rounds_to_paise() {
        let kind = CouponKind::CappedPercentage {
            percent: Percentage::from(0.5),
            cap: Decimal::from(150),
        };

        assert_eq!(kind.discount_on(Decimal::new(3333, 2)), Decimal::new(1667, 2));
    }

    #[test]
    fn coupon_reads_backend_shape() -> TestResult {
        let coupon: Coupon = serde_json::from_value(serde_json::json!({
            "coupon": "FREEDEL",
            "discount_amount": "49",
        }))?;

        assert_eq!(coupon.discount_amount, Decimal::from(49));

        Ok(())
    }
}
