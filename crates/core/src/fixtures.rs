//! Product Fixtures

use rust_decimal::Decimal;

use crate::{money::parse_amount, products::Product};

/// Canonical-schema product with whole-rupee prices.
pub(crate) fn canonical(id: u64, base: Option<i64>, discounted: Option<i64>) -> Product {
    let mut product = Product::new(id, format!("Product {id}"));

    product.prices.base_price = base.map(Decimal::from);
    product.prices.discounted_price = discounted.map(Decimal::from);

    product
}

/// Legacy-schema product; prices are given as the backend's decimal strings.
pub(crate) fn legacy(id: u64, price: &str, regular_price: &str, on_sale: bool) -> Product {
    let mut product = Product::new(id, format!("Legacy {id}"));

    product.prices.price = parse_amount(price);
    product.prices.regular_price = parse_amount(regular_price);
    product.prices.on_sale = on_sale;

    product
}
