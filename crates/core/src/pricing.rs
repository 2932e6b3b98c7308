//! Pricing
//!
//! Canonical price, strikethrough price, image and sale status for a [`Product`], whichever
//! schema it arrived in. Every function here is total: missing or malformed fields fall through
//! to the next candidate instead of failing.

use rust_decimal::Decimal;

use crate::{cart::CartItem, products::Product};

/// Unit price charged when no price field resolves to a positive amount.
pub const DEFAULT_PRICE: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Resolve the unit price a customer pays for `product`.
///
/// Candidates are tried in order: canonical `discounted_price`, canonical `base_price`, legacy
/// `sale_price`, legacy `price`, legacy `regular_price`. The first strictly positive amount wins;
/// [`DEFAULT_PRICE`] is returned when none qualifies.
pub fn resolve_price(product: &Product) -> Decimal {
    let prices = &product.prices;

    [
        prices.discounted_price,
        prices.base_price,
        prices.sale_price,
        prices.price,
        prices.regular_price,
    ]
    .into_iter()
    .flatten()
    .find(|amount| amount.is_sign_positive() && !amount.is_zero())
    .unwrap_or(DEFAULT_PRICE)
}

/// Resolve the pre-discount price to show struck through, if a discount is in effect.
pub fn resolve_original_price(product: &Product) -> Option<Decimal> {
    let prices = &product.prices;

    if let (Some(base), Some(discounted)) = (prices.base_price, prices.discounted_price)
        && discounted > Decimal::ZERO
        && discounted < base
    {
        return Some(base);
    }

    if prices.on_sale {
        return prices.regular_price.filter(|regular| *regular > Decimal::ZERO);
    }

    None
}

/// Whether `product` is currently sold below its list price.
pub fn is_discounted(product: &Product) -> bool {
    let prices = &product.prices;

    match (prices.base_price, prices.discounted_price) {
        (Some(base), Some(discounted)) => discounted > Decimal::ZERO && discounted < base,
        _ => prices.on_sale,
    }
}

/// Resolve the primary image URL for `product`.
///
/// The canonical `image` field wins over the first legacy gallery entry. Root-relative paths
/// are rebased onto `origin`; absolute URLs are returned untouched. Returns an empty string
/// when the product has no image.
pub fn resolve_image(product: &Product, origin: &str) -> String {
    let path = product
        .image
        .as_deref()
        .or_else(|| product.images.first().map(|image| image.src.as_str()))
        .unwrap_or_default();

    if path.starts_with('/') {
        format!("{}{path}", origin.trim_end_matches('/'))
    } else {
        path.to_string()
    }
}

/// Derive the asset origin from an API base URL by dropping its trailing `/api` segment.
///
/// `https://shop.example.com/api/` becomes `https://shop.example.com`.
pub fn asset_origin(api_base: &str) -> String {
    let trimmed = api_base.trim_end_matches('/');

    trimmed
        .strip_suffix("/api")
        .unwrap_or(trimmed)
        .to_string()
}

/// Sum of resolved unit price times quantity over `items`, saturating at [`Decimal::MAX`].
pub fn total_price(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .map(CartItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use crate::{
        fixtures::{canonical, legacy},
        products::ImageRef,
    };

    use super::*;

    #[test]
    fn discounted_price_beats_base_price() {
        let product = canonical(1, Some(50), Some(30));

        assert_eq!(resolve_price(&product), Decimal::from(30));
    }

    #[test]
    fn base_price_used_without_discount() {
        let product = canonical(1, Some(100), None);

        assert_eq!(resolve_price(&product), Decimal::from(100));
    }

    #[test]
    fn legacy_price_used_when_canonical_missing() {
        let product = legacy(2, "25.50", "30", false);

        assert_eq!(resolve_price(&product), Decimal::new(2550, 2));
    }

    #[test]
    fn legacy_regular_price_is_last_resort() {
        let product = legacy(2, "", "35", false);

        assert_eq!(resolve_price(&product), Decimal::from(35));
    }

    #[test]
    fn zero_and_negative_fall_through_to_default() {
        let mut product = canonical(1, Some(0), None);
        product.prices.discounted_price = Some(Decimal::from(-5));

        assert_eq!(resolve_price(&product), DEFAULT_PRICE);
    }

    #[test]
    fn zero_discount_falls_through_to_base() {
        let product = canonical(1, Some(80), Some(0));

        assert_eq!(resolve_price(&product), Decimal::from(80));
    }

    #[test]
    fn empty_product_uses_default() {
        let product = Product::new(1_u64, "Sem");

        assert_eq!(resolve_price(&product), Decimal::from(40));
    }

    #[test]
    fn original_price_only_when_discounted() {
        assert_eq!(
            resolve_original_price(&canonical(1, Some(50), Some(30))),
            Some(Decimal::from(50))
        );
        assert_eq!(resolve_original_price(&canonical(1, Some(50), Some(50))), None);
        assert_eq!(resolve_original_price(&canonical(1, Some(50), None)), None);
    }

    #[test]
    fn original_price_for_legacy_sale() {
        assert_eq!(
            resolve_original_price(&legacy(1, "30", "35", true)),
            Some(Decimal::from(35))
        );
        assert_eq!(resolve_original_price(&legacy(1, "30", "35", false)), None);
        assert_eq!(resolve_original_price(&legacy(1, "30", "", true)), None);
    }

    #[test]
    fn discount_detection() {
        assert!(is_discounted(&canonical(1, Some(50), Some(30))));
        assert!(!is_discounted(&canonical(1, Some(50), Some(60))));
        assert!(is_discounted(&legacy(1, "30", "35", true)));
        assert!(!is_discounted(&legacy(1, "30", "35", false)));
    }

    #[test]
    fn relative_image_rebased_onto_origin() {
        let mut product = Product::new(1_u64, "Beans");
        product.image = Some("/media/beans.jpg".to_string());

        assert_eq!(
            resolve_image(&product, "https://shop.example.com"),
            "https://shop.example.com/media/beans.jpg"
        );
    }

    #[test]
    fn absolute_image_passes_through() {
        let mut product = Product::new(1_u64, "Beans");
        product.images.push(ImageRef {
            src: "https://cdn.example.com/beans.jpg".to_string(),
            alt: String::new(),
        });

        assert_eq!(
            resolve_image(&product, "https://shop.example.com"),
            "https://cdn.example.com/beans.jpg"
        );
    }

    #[test]
    fn canonical_image_wins_over_gallery() {
        let mut product = Product::new(1_u64, "Beans");
        product.image = Some("/media/a.jpg".to_string());
        product.images.push(ImageRef {
            src: "/media/b.jpg".to_string(),
            alt: String::new(),
        });

        assert_eq!(resolve_image(&product, "http://x/"), "http://x/media/a.jpg");
    }

    #[test]
    fn missing_image_is_empty() {
        assert_eq!(resolve_image(&Product::new(1_u64, "Beans"), "http://x"), "");
    }

    #[test]
    fn asset_origin_strips_api_segment() {
        assert_eq!(asset_origin("https://shop.example.com/api/"), "https://shop.example.com");
        assert_eq!(asset_origin("http://localhost:8000/api"), "http://localhost:8000");
        assert_eq!(asset_origin("https://cdn.example.com"), "https://cdn.example.com");
    }
}
