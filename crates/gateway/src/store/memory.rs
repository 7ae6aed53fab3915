//! In-memory implementation of every store port.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use shipgate_core::{
    Customer, Order, OrderId, ShipmentLabel, Shop, ShopId, UserId, WebhookEvent,
};
use tokio::sync::RwLock;

use super::{OrderRepository, ShopDirectory, StoreError, WebhookEventLog};

/// Fixture format accepted by [`MemoryStore::load`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub shops: Vec<SeedShop>,
    pub customers: Vec<SeedCustomer>,
    pub orders: Vec<SeedOrder>,
    pub events: Vec<WebhookEvent>,
}

/// A shop and the users allowed to act for it.
#[derive(Debug, Deserialize)]
pub struct SeedShop {
    pub users: Vec<UserId>,
    pub shop: Shop,
}

#[derive(Debug, Deserialize)]
pub struct SeedCustomer {
    pub shop_id: ShopId,
    pub customer: Customer,
}

#[derive(Debug, Deserialize)]
pub struct SeedOrder {
    pub shop_id: ShopId,
    pub order: Order,
}

/// `HashMap`-backed store for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shops: RwLock<HashMap<ShopId, Shop>>,
    grants: RwLock<HashSet<(UserId, ShopId)>>,
    orders: RwLock<HashMap<(ShopId, OrderId), Order>>,
    customers: RwLock<HashMap<(ShopId, String), Customer>>,
    events: RwLock<Vec<WebhookEvent>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a fixture.
    #[must_use]
    pub fn from_seed(seed: Seed) -> Self {
        let mut store = Self::new();
        for SeedShop { users, shop } in seed.shops {
            for user in users {
                store = store.with_grant(user, shop.id.clone());
            }
            store = store.with_shop(shop);
        }
        for SeedCustomer { shop_id, customer } in seed.customers {
            store = store.with_customer(shop_id, customer);
        }
        for SeedOrder { shop_id, order } in seed.orders {
            store = store.with_order(shop_id, order);
        }
        for event in seed.events {
            store = store.with_event(event);
        }
        store
    }

    /// Load a JSON fixture from disk.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the file cannot be read and
    /// `StoreError::Corrupt` if it is not a valid fixture.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        let seed: Seed = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        Ok(Self::from_seed(seed))
    }

    #[must_use]
    pub fn with_shop(mut self, shop: Shop) -> Self {
        self.shops.get_mut().insert(shop.id.clone(), shop);
        self
    }

    /// Allow `user_id` to act for `shop_id`.
    #[must_use]
    pub fn with_grant(mut self, user_id: UserId, shop_id: ShopId) -> Self {
        self.grants.get_mut().insert((user_id, shop_id));
        self
    }

    #[must_use]
    pub fn with_customer(mut self, shop_id: ShopId, customer: Customer) -> Self {
        self.customers
            .get_mut()
            .insert((shop_id, customer.phone.clone()), customer);
        self
    }

    #[must_use]
    pub fn with_order(mut self, shop_id: ShopId, order: Order) -> Self {
        self.orders
            .get_mut()
            .insert((shop_id, order.id.clone()), order);
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: WebhookEvent) -> Self {
        self.events.get_mut().push(event);
        self
    }

    /// Record a webhook event on a shared store.
    pub async fn push_event(&self, event: WebhookEvent) {
        self.events.write().await.push(event);
    }

    /// Snapshot of a stored order.
    pub async fn order(&self, shop_id: &ShopId, order_id: &OrderId) -> Option<Order> {
        self.orders
            .read()
            .await
            .get(&(shop_id.clone(), order_id.clone()))
            .cloned()
    }
}

impl ShopDirectory for MemoryStore {
    async fn find_shop(
        &self,
        user_id: &UserId,
        shop_id: &ShopId,
    ) -> Result<Option<Shop>, StoreError> {
        if !self
            .grants
            .read()
            .await
            .contains(&(user_id.clone(), shop_id.clone()))
        {
            return Ok(None);
        }
        Ok(self.shops.read().await.get(shop_id).cloned())
    }
}

impl OrderRepository for MemoryStore {
    async fn find_order(
        &self,
        order_id: &OrderId,
        shop_id: &ShopId,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self.order(shop_id, order_id).await)
    }

    async fn find_customer_by_phone(
        &self,
        phone: &str,
        shop_id: &ShopId,
    ) -> Result<Option<Customer>, StoreError> {
        Ok(self
            .customers
            .read()
            .await
            .get(&(shop_id.clone(), phone.to_string()))
            .cloned())
    }

    async fn save_order(&self, shop_id: &ShopId, order: &Order) -> Result<(), StoreError> {
        self.orders
            .write()
            .await
            .insert((shop_id.clone(), order.id.clone()), order.clone());
        Ok(())
    }
}

impl WebhookEventLog for MemoryStore {
    async fn events_for_label(
        &self,
        label: &ShipmentLabel,
    ) -> Result<Vec<WebhookEvent>, StoreError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| &event.label == label)
            .cloned()
            .collect())
    }
}
