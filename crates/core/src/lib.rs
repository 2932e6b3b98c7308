//! Sabzi
//!
//! Client-side cart, pricing and delivery state for the Sabzi organic grocery storefront.
//!
//! Everything in this crate is synchronous and side-effect free apart from the [`storage`]
//! seam. Network reconciliation lives in `sabzi-app`.

pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod delivery;
pub mod money;
pub mod orders;
pub mod payload;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod storage;

#[cfg(test)]
pub(crate) mod fixtures;
