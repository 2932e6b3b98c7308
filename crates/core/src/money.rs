//! Money

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde_json::Value;

/// Currency every storefront amount is denominated in.
pub const CURRENCY: &Currency = iso::INR;

/// Parse a backend amount that may arrive as a JSON number or a decimal string.
///
/// Anything that cannot be read as a decimal (`null`, `""`, `"N/A"`, objects) yields `None`
/// rather than an error.
pub fn amount_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_amount(&number.to_string()),
        Value::String(text) => parse_amount(text),
        _ => None,
    }
}

/// Parse a decimal amount from text, accepting scientific notation.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    Decimal::from_str(text)
        .or_else(|_err| Decimal::from_scientific(text))
        .ok()
}

/// Round an amount to whole paise.
pub fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Wrap an amount in the storefront currency.
pub fn to_money(amount: Decimal) -> Money<'static, Currency> {
    Money::from_decimal(round_minor(amount), CURRENCY)
}

/// Render an amount for display, e.g. `₹1,150.00`.
pub fn format_amount(amount: Decimal) -> String {
    to_money(amount).to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_strings_parse() {
        assert_eq!(amount_from_value(&json!(120)), Some(Decimal::from(120)));
        assert_eq!(amount_from_value(&json!(12.5)), Some(Decimal::new(125, 1)));
        assert_eq!(amount_from_value(&json!("99.90")), Some(Decimal::new(9990, 2)));
        assert_eq!(amount_from_value(&json!(" 45 ")), Some(Decimal::from(45)));
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(amount_from_value(&json!("")), None);
        assert_eq!(amount_from_value(&json!("Sem")), None);
        assert_eq!(amount_from_value(&json!(null)), None);
        assert_eq!(amount_from_value(&json!(true)), None);
        assert_eq!(amount_from_value(&json!({"amount": 5})), None);
    }

    #[test]
    fn scientific_notation_parses() {
        assert_eq!(parse_amount("1e2"), Some(Decimal::from(100)));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_minor(Decimal::new(10_005, 3)), Decimal::new(1001, 2));
        assert_eq!(round_minor(Decimal::new(10_004, 3)), Decimal::new(1000, 2));
    }

    #[test]
    fn money_uses_rupees() {
        let money = to_money(Decimal::from(40));

        assert_eq!(money.currency(), CURRENCY);
        assert_eq!(*money.amount(), Decimal::from(40));
    }
}
