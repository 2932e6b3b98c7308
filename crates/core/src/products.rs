//! Products
//!
//! The backend serves products in two shapes: the canonical local catalog
//! (`base_price`/`discounted_price`/`image`) and the legacy proxied catalog
//! (`price`/`regular_price`/`sale_price`/`on_sale`/`images`). Both are read through
//! [`ProductRecord`] into a single [`Product`] so nothing downstream branches on the wire shape.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::money::amount_from_value;

/// Stock assumed for an active product that does not report a stock quantity.
pub const UNTRACKED_STOCK: i64 = 100;

/// Product identifier.
///
/// The canonical catalog uses integer ids and the legacy catalog uses strings, so ids are
/// compared as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from its textual form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as the backend expects it: a number when the text is a canonical integer,
    /// otherwise a string. Ids such as `"007"` stay strings so they read back unchanged.
    pub fn to_json(&self) -> Value {
        match self.0.parse::<u64>() {
            Ok(number) if number.to_string() == self.0 => Value::from(number),
            _ => Value::String(self.0.clone()),
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// An entry in a legacy product image gallery.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageRef {
    /// Image URL or root-relative path.
    pub src: String,

    /// Alternative text.
    pub alt: String,
}

/// Every price-bearing field a product may carry, already parsed.
///
/// Malformed values are stored as `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceFields {
    /// Canonical list price.
    pub base_price: Option<Decimal>,

    /// Canonical discounted price.
    pub discounted_price: Option<Decimal>,

    /// Legacy effective price.
    pub price: Option<Decimal>,

    /// Legacy list price.
    pub regular_price: Option<Decimal>,

    /// Legacy sale price.
    pub sale_price: Option<Decimal>,

    /// Legacy sale flag.
    pub on_sale: bool,
}

/// Catalog product, normalized from either backend schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductRecord", into = "ProductRecord")]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Routing slug
    pub slug: Option<String>,

    /// Display name
    pub name: String,

    /// Price fields
    pub prices: PriceFields,

    /// Canonical single image
    pub image: Option<String>,

    /// Legacy image gallery, primary image first
    pub images: Vec<ImageRef>,

    /// Reported stock, if tracked
    pub stock_quantity: Option<i64>,

    /// Whether the product is listed for sale
    pub is_active: bool,
}

impl Product {
    /// Create an active product with no price or image data.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: None,
            name: name.into(),
            prices: PriceFields::default(),
            image: None,
            images: Vec::new(),
            stock_quantity: None,
            is_active: true,
        }
    }

    /// Stock available to add to a cart.
    ///
    /// Active products without a stock quantity are treated as having
    /// [`UNTRACKED_STOCK`] units.
    pub fn available_stock(&self) -> i64 {
        match self.stock_quantity {
            Some(quantity) => quantity.max(0),
            None if self.is_active => UNTRACKED_STOCK,
            None => 0,
        }
    }

    /// Whether the product can currently be added to a cart.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.available_stock() > 0
    }

    /// Whether this product answers to `key` as either its id or its slug.
    pub fn matches(&self, key: &str) -> bool {
        self.id.as_str() == key || self.slug.as_deref() == Some(key)
    }
}

/// Wire form of a product, tolerant of both schemas and of malformed numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    base_price: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    discounted_price: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    price: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    regular_price: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    sale_price: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_sale: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    images: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    stock_quantity: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Number(Number),
    Text(String),
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        let id = match record.id {
            RecordId::Number(number) => ProductId(number.to_string()),
            RecordId::Text(text) => ProductId(text),
        };

        Self {
            id,
            slug: record.slug.filter(|slug| !slug.is_empty()),
            name: record.name.unwrap_or_default(),
            prices: PriceFields {
                base_price: amount_from_value(&record.base_price),
                discounted_price: amount_from_value(&record.discounted_price),
                price: amount_from_value(&record.price),
                regular_price: amount_from_value(&record.regular_price),
                sale_price: amount_from_value(&record.sale_price),
                on_sale: record.on_sale.unwrap_or(false),
            },
            image: record.image.filter(|image| !image.is_empty()),
            images: images_from_value(&record.images),
            stock_quantity: stock_from_value(&record.stock_quantity),
            is_active: record.is_active.unwrap_or(true),
        }
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        let amount = |value: Option<Decimal>| value.map_or(Value::Null, |d| d.to_string().into());

        let images = if product.images.is_empty() {
            Value::Null
        } else {
            product
                .images
                .into_iter()
                .map(|image| serde_json::json!({ "src": image.src, "alt": image.alt }))
                .collect()
        };

        let id = match product.id.to_json() {
            Value::Number(number) => RecordId::Number(number),
            _ => RecordId::Text(product.id.0),
        };

        Self {
            id,
            slug: product.slug,
            name: Some(product.name),
            base_price: amount(product.prices.base_price),
            discounted_price: amount(product.prices.discounted_price),
            price: amount(product.prices.price),
            regular_price: amount(product.prices.regular_price),
            sale_price: amount(product.prices.sale_price),
            on_sale: product.prices.on_sale.then_some(true),
            image: product.image,
            images,
            stock_quantity: product.stock_quantity.map_or(Value::Null, Value::from),
            is_active: Some(product.is_active),
        }
    }
}

fn images_from_value(value: &Value) -> Vec<ImageRef> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let src = entry.get("src")?.as_str()?.to_string();
            let alt = entry
                .get("alt")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            Some(ImageRef { src, alt })
        })
        .collect()
}

fn stock_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
