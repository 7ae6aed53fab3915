//! Orders and customers owned by the storage collaborator.
//!
//! The gateway only ever writes back three fields of an [`Order`]:
//! `shipment_code`, `partner_ship_fee` and `search_index`, and only once,
//! when the carrier accepts the shipment.

use serde::{Deserialize, Serialize};

use super::id::{OrderId, ShipmentLabel};

/// Weight heuristic applied per unit of quantity, in grams.
pub const GRAMS_PER_UNIT: u64 = 150;

/// A line item. The title is stored in its encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrderItem {
    pub title: String,
    pub quantity: u32,
}

/// A customer order.
///
/// Every field defaults so that ad-hoc payloads (fee quotes) can omit what
/// they do not need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub ward: String,
    pub note: String,
    pub total: i64,
    /// Carrier label; empty until the order has been submitted.
    pub shipment_code: ShipmentLabel,
    pub partner_ship_fee: i64,
    pub search_index: String,
}

impl Order {
    /// Whether the carrier has already accepted this order.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        !self.shipment_code.is_empty()
    }

    /// Sum of item quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Parcel weight in grams used for fee quotes.
    #[must_use]
    pub fn shipping_weight_grams(&self) -> u64 {
        self.items
            .iter()
            .map(|item| GRAMS_PER_UNIT * u64::from(item.quantity))
            .sum()
    }

    /// Record the carrier's acceptance of this order.
    ///
    /// The label is also appended to the search index so the order can be
    /// found by it.
    pub fn mark_submitted(&mut self, label: ShipmentLabel, fee: i64) {
        if !self.search_index.is_empty() {
            self.search_index.push(' ');
        }
        self.search_index.push_str(label.as_str());
        self.shipment_code = label;
        self.partner_ship_fee = fee;
    }
}

/// Delivery recipient, looked up by phone number within a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub district: String,
    pub ward: String,
    pub address: String,
}
