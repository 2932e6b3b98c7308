//! Stores
//!
//! Each store owns one piece of client state behind a lock and exposes the operations that
//! change it. Locks are never held across an `.await`: async operations take a snapshot, call
//! the backend, then lock again to apply the result.

pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod orders;

pub use cart::CartStore;
pub use catalog::CatalogStore;
pub use delivery::DeliveryStore;
pub use orders::OrdersStore;
