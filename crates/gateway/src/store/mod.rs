//! Ports to the systems that own gateway data.
//!
//! The gateway never owns shops, orders, customers or webhook events. It
//! reaches them through these traits:
//!
//! - [`ShopDirectory`] - shop lookup scoped to the calling user
//! - [`OrderRepository`] - orders and customers of a shop
//! - [`WebhookEventLog`] - carrier status callbacks by shipment label
//!
//! [`MemoryStore`] implements all three and backs tests and local runs.
//!
//! # Consistency
//!
//! An order is read, checked and written back without any lock or
//! compare-and-swap. Two concurrent submissions of the same order can both
//! see an empty shipment code and both reach the carrier.

mod memory;

use std::future::Future;

use shipgate_core::{
    Customer, Order, OrderId, ShipmentLabel, Shop, ShopId, UserId, WebhookEvent,
};
use thiserror::Error;

pub use memory::{MemoryStore, Seed, SeedCustomer, SeedOrder, SeedShop};

/// Errors that can occur when reaching a data owner.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing system could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Data in the backing system is corrupted or invalid.
    #[error("data corruption: {0}")]
    Corrupt(String),
}

/// Resolves which shop a user is acting for.
pub trait ShopDirectory: Send + Sync {
    /// `None` when the user has no access to the shop.
    fn find_shop(
        &self,
        user_id: &UserId,
        shop_id: &ShopId,
    ) -> impl Future<Output = Result<Option<Shop>, StoreError>> + Send;
}

/// Orders and customers, always scoped to one shop.
pub trait OrderRepository: Send + Sync {
    fn find_order(
        &self,
        order_id: &OrderId,
        shop_id: &ShopId,
    ) -> impl Future<Output = Result<Option<Order>, StoreError>> + Send;

    fn find_customer_by_phone(
        &self,
        phone: &str,
        shop_id: &ShopId,
    ) -> impl Future<Output = Result<Option<Customer>, StoreError>> + Send;

    /// Replace the stored order with this one.
    fn save_order(
        &self,
        shop_id: &ShopId,
        order: &Order,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read side of the carrier webhook event store.
pub trait WebhookEventLog: Send + Sync {
    /// Events for a label, in the order they were recorded.
    fn events_for_label(
        &self,
        label: &ShipmentLabel,
    ) -> impl Future<Output = Result<Vec<WebhookEvent>, StoreError>> + Send;
}
