//! Cart
//!
//! The cart aggregate and its synchronous state transitions. Every mutation recomputes
//! [`Cart::total_amount`] from scratch, so the total can never drift from the line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    coupons::{Coupon, CouponError},
    pricing::{resolve_price, total_price},
    products::{Product, ProductId},
    storage::{CART_KEY, Storage, StorageError},
};

/// A product snapshot and how many units of it are in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product as it was when added; later catalog changes do not apply.
    pub product: Product,

    /// Units in the cart, always positive.
    pub quantity: u32,
}

impl CartItem {
    /// Resolved unit price times quantity, saturating at [`Decimal::MAX`].
    pub fn line_total(&self) -> Decimal {
        resolve_price(&self.product).saturating_mul(Decimal::from(self.quantity))
    }
}

/// What an [`Cart::add_or_adjust`] call did to the item set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// A new line was created with this quantity.
    Added(u32),

    /// An existing line now has this quantity.
    Updated(u32),

    /// The line reached zero and was dropped.
    Removed,

    /// Nothing to do: no line existed and the delta was not positive.
    Unchanged,
}

/// Client-side cart state.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    total_amount: Decimal,
    coupon: Option<Coupon>,
    coupon_error: Option<String>,
    error: Option<String>,
    is_loading: bool,
    revision: u64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart holding `items`.
    ///
    /// Lines for the same product are merged and non-positive lines dropped, so the one line
    /// per product rule holds for data read from storage or the server.
    pub fn with_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();

        cart.items = merge_lines(items);
        cart.recompute();

        cart
    }

    /// Read the persisted cart from `storage`.
    ///
    /// A missing or unreadable snapshot yields an empty cart.
    pub fn hydrate(storage: &dyn Storage) -> Self {
        match load_items(storage) {
            Ok(items) => Self::with_items(items),
            Err(error) => {
                warn!(%error, "discarding unreadable cart snapshot");
                Self::new()
            }
        }
    }

    /// Write the line items through to `storage`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the snapshot could not be encoded or written.
    pub fn persist(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(&self.items)?;

        storage.set(CART_KEY, &snapshot)
    }

    /// Remove the persisted snapshot from `storage`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the snapshot could not be removed.
    pub fn discard(storage: &dyn Storage) -> Result<(), StorageError> {
        storage.remove(CART_KEY)
    }

    /// Line items, in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Line for `product_id`, if any.
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of resolved unit price times quantity.
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Applied coupon, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Applied coupon code, if any.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(|coupon| coupon.code.as_str())
    }

    /// Discount from the applied coupon, zero without one.
    pub fn discount_amount(&self) -> Decimal {
        self.coupon
            .as_ref()
            .map_or(Decimal::ZERO, |coupon| coupon.discount_amount)
    }

    /// Total after the coupon discount, never below zero.
    pub fn payable_amount(&self) -> Decimal {
        self.total_amount
            .saturating_sub(self.discount_amount())
            .max(Decimal::ZERO)
    }

    /// Last coupon failure, shown next to the coupon field.
    pub fn coupon_error(&self) -> Option<&str> {
        self.coupon_error.as_deref()
    }

    /// Last cart-level failure, shown as a banner.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a backend request for this cart is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Counter bumped by every change to the line items.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of line item changes made after [`Cart::revision`] returned `revision`.
    pub fn changes_since(&self, revision: u64) -> u64 {
        self.revision.saturating_sub(revision)
    }

    /// Adjust the quantity of `product` by `delta`, creating or dropping its line as needed.
    ///
    /// A new line stores a copy of `product`; an existing line keeps its original snapshot.
    /// Clears any cart-level error.
    pub fn add_or_adjust(&mut self, product: &Product, delta: i64) -> QuantityChange {
        let position = self
            .items
            .iter()
            .position(|item| item.product.id == product.id);

        let change = match position {
            Some(index) => self.adjust_line(index, delta),
            None if delta > 0 => {
                let quantity = clamp_quantity(delta);

                self.items.push(CartItem {
                    product: product.clone(),
                    quantity,
                });

                QuantityChange::Added(quantity)
            }
            None => QuantityChange::Unchanged,
        };

        self.error = None;
        self.touch();

        change
    }

    /// Drop the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();

        self.items.retain(|item| &item.product.id != product_id);
        self.touch();

        self.items.len() != before
    }

    /// Empty the cart and forget any coupon.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon = None;
        self.coupon_error = None;
        self.touch();
    }

    /// Replace every line with `items` from an authoritative source.
    ///
    /// An empty list empties the cart.
    pub fn replace_items(&mut self, items: impl IntoIterator<Item = CartItem>) {
        self.items = merge_lines(items);
        self.touch();
    }

    /// Record an accepted coupon.
    pub fn apply_coupon(&mut self, coupon: Coupon) {
        self.coupon = Some(coupon);
        self.coupon_error = None;
    }

    /// Record a refused coupon, dropping any previously applied one.
    pub fn reject_coupon(&mut self, error: &CouponError) {
        self.coupon = None;
        self.coupon_error = Some(error.to_string());
    }

    /// Forget the applied coupon and any coupon error.
    pub fn remove_coupon(&mut self) {
        self.coupon = None;
        self.coupon_error = None;
    }

    /// Mark the start of a backend request; clears the previous cart-level error.
    pub fn begin_request(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Mark the end of a backend request.
    pub fn finish_request(&mut self) {
        self.is_loading = false;
    }

    /// Mark the end of a failed backend request.
    pub fn fail_request(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    fn adjust_line(&mut self, index: usize, delta: i64) -> QuantityChange {
        let Some(item) = self.items.get_mut(index) else {
            return QuantityChange::Unchanged;
        };

        let quantity = i64::from(item.quantity).saturating_add(delta);

        if quantity <= 0 {
            self.items.remove(index);

            return QuantityChange::Removed;
        }

        item.quantity = clamp_quantity(quantity);

        QuantityChange::Updated(item.quantity)
    }

    fn touch(&mut self) {
        self.recompute();
        self.revision += 1;
    }

    fn recompute(&mut self) {
        self.total_amount = total_price(&self.items);
    }
}

fn load_items(storage: &dyn Storage) -> Result<Vec<CartItem>, StorageError> {
    match storage.get(CART_KEY)? {
        Some(snapshot) => Ok(serde_json::from_str(&snapshot)?),
        None => Ok(Vec::new()),
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(u32::MAX)
}

fn merge_lines(items: impl IntoIterator<Item = CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::new();

    for item in items {
        if item.quantity == 0 {
            continue;
        }

        match merged
            .iter_mut()
            .find(|existing| existing.product.id == item.product.id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }

    merged
}
