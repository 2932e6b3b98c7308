//! Backend client, async stores and checkout for the Sabzi storefront.

pub mod api;
pub mod checkout;
pub mod config;
pub mod context;
pub mod observability;
pub mod storage;
pub mod stores;
