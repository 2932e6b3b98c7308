//! Price resolution over untrusted catalog payloads

use rust_decimal::Decimal;
use sabzi::{
    cart::Cart,
    checkout::Charges,
    pricing::{DEFAULT_PRICE, is_discounted, resolve_original_price, resolve_price},
    products::Product,
};
use serde_json::{Value, json};
use testresult::TestResult;

fn junk_values() -> Vec<Value> {
    vec![
        Value::Null,
        json!(""),
        json!("N/A"),
        json!("0"),
        json!(0),
        json!(-12.5),
        json!("-3"),
        json!("1e2"),
        json!(" 45.50 "),
        json!("9e27"),
        json!(99),
        json!(true),
        json!({ "amount": 10 }),
        json!([5]),
    ]
}

#[test]
fn resolved_price_is_always_positive() -> TestResult {
    let values = junk_values();

    for (index, value) in values.iter().enumerate() {
        for other in &values {
            let product: Product = serde_json::from_value(json!({
                "id": index,
                "name": "Fuzzed",
                "base_price": value,
                "discounted_price": other,
                "price": other,
                "regular_price": value,
                "sale_price": value,
                "on_sale": true,
            }))?;

            let price = resolve_price(&product);

            assert!(price > Decimal::ZERO, "{value} / {other} resolved to {price}");

            if let Some(original) = resolve_original_price(&product) {
                assert!(original > Decimal::ZERO);
            }
        }
    }

    Ok(())
}

#[test]
fn no_usable_fields_resolves_default() -> TestResult {
    for value in junk_values().into_iter().filter(|value| !value.is_number()) {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "base_price": value.clone(),
            "price": value,
        }))?;

        if product.prices.base_price.is_none_or(|amount| amount <= Decimal::ZERO) {
            assert_eq!(resolve_price(&product), DEFAULT_PRICE);
        }
    }

    Ok(())
}

#[test]
fn canonical_discount_beats_legacy_sale() -> TestResult {
    let product: Product = serde_json::from_value(json!({
        "id": 9,
        "base_price": "80",
        "discounted_price": "60",
        "price": "70",
        "regular_price": "90",
        "on_sale": false,
    }))?;

    assert_eq!(resolve_price(&product), Decimal::from(60));
    assert_eq!(resolve_original_price(&product), Some(Decimal::from(80)));
    assert!(is_discounted(&product));

    Ok(())
}

#[test]
fn huge_prices_saturate_totals() -> TestResult {
    let product: Product = serde_json::from_value(json!({
        "id": 1,
        "name": "Saffron",
        "base_price": "9e27",
    }))?;

    let mut cart = Cart::new();
    cart.add_or_adjust(&product, 10);
    cart.add_or_adjust(&product, i64::from(u32::MAX));

    assert_eq!(resolve_price(&product), Decimal::from_scientific("9e27")?);
    assert_eq!(cart.total_amount(), Decimal::MAX);
    assert_eq!(Charges::for_cart(&cart).grand_total, Decimal::MAX);

    let restored = Cart::with_items(cart.items().to_vec());

    assert_eq!(restored.total_amount(), Decimal::MAX);

    Ok(())
}
