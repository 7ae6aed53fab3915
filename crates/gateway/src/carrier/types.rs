//! Carrier request payloads and the response envelope.

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use shipgate_core::{Customer, GRAMS_PER_UNIT, Order, ShopConfig};

/// Length of the client-side shipment reference sent with each order.
pub const SHIPMENT_REFERENCE_LEN: usize = 8;

/// The carrier's JSON envelope. Every endpoint answers with this shape;
/// fields an endpoint does not use stay at their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct CarrierResponse {
    pub success: bool,
    pub message: String,
    pub order: CreatedOrder,
    pub fee: FeeDetails,
}

/// `order` block of a create-shipment response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct CreatedOrder {
    pub partner_id: String,
    /// Carrier-issued shipment label.
    pub label: String,
    pub area: String,
    /// Shipping fee, sent by the carrier as a decimal string.
    pub fee: String,
    pub insurance_fee: String,
    pub estimated_pick_time: String,
    pub estimated_deliver_time: String,
}

/// `fee` block of a fee-quote response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct FeeDetails {
    pub name: String,
    pub fee: i64,
    pub insurance_fee: i64,
    pub delivery_type: String,
}

/// One parcel line in a create-shipment request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    /// Kilograms.
    pub weight: f64,
    pub quantity: u32,
}

impl Product {
    /// A product line whose weight follows the per-unit heuristic.
    #[must_use]
    pub fn new(name: String, quantity: u32) -> Self {
        #[allow(clippy::cast_precision_loss)] // small constant
        let kilograms_per_unit = GRAMS_PER_UNIT as f64 / 1000.0;
        Self {
            name,
            weight: kilograms_per_unit * f64::from(quantity),
            quantity,
        }
    }
}

/// Pickup and delivery details of a create-shipment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentOrder {
    pub id: String,
    pub pick_name: String,
    pub pick_address_id: String,
    pub pick_address: String,
    pub pick_ward: String,
    pub pick_province: String,
    pub pick_district: String,
    pub pick_tel: String,
    pub tel: String,
    pub name: String,
    pub address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub is_freeship: String,
    pub pick_date: String,
    /// Amount the carrier collects on delivery.
    pub pick_money: i64,
    pub note: String,
    /// Declared value for insurance.
    pub value: i64,
}

/// Body of `POST services/shipment/order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRequest {
    pub products: Vec<Product>,
    pub order: ShipmentOrder,
}

impl ShipmentRequest {
    /// Build a request: pickup from the shop, delivery to the customer,
    /// amounts and note from the order.
    #[must_use]
    pub fn new(
        shop_name: &str,
        pickup: &ShopConfig,
        customer: &Customer,
        order: &Order,
        products: Vec<Product>,
    ) -> Self {
        Self {
            products,
            order: ShipmentOrder {
                id: shipment_reference(),
                pick_name: shop_name.to_string(),
                pick_address_id: pickup.carrier_warehouse_id.clone(),
                pick_address: pickup.address.clone(),
                pick_ward: pickup.ward.clone(),
                pick_province: pickup.province.clone(),
                pick_district: pickup.district.clone(),
                pick_tel: pickup.phone.clone(),
                tel: customer.phone.clone(),
                name: customer.name.clone(),
                address: customer.address.clone(),
                province: customer.city.clone(),
                district: customer.district.clone(),
                ward: customer.ward.clone(),
                is_freeship: "1".to_string(),
                pick_date: String::new(),
                pick_money: order.total,
                note: order.note.clone(),
                value: 0,
            },
        }
    }
}

/// Query of `POST services/shipment/fee`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeQuery {
    pub pick_province: String,
    pub pick_district: String,
    pub pick_ward: String,
    pub pick_address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub address: String,
    /// Grams.
    pub weight: u64,
}

impl FeeQuery {
    #[must_use]
    pub fn new(pickup: &ShopConfig, order: &Order) -> Self {
        Self {
            pick_province: pickup.province.clone(),
            pick_district: pickup.district.clone(),
            pick_ward: pickup.ward.clone(),
            pick_address: pickup.address.clone(),
            province: order.city.clone(),
            district: order.district.clone(),
            ward: order.ward.clone(),
            address: order.address.clone(),
            weight: order.shipping_weight_grams(),
        }
    }

    /// Query-string pairs in the order the carrier documents them.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, String); 9] {
        [
            ("pick_province", self.pick_province.clone()),
            ("pick_district", self.pick_district.clone()),
            ("pick_ward", self.pick_ward.clone()),
            ("pick_address", self.pick_address.clone()),
            ("province", self.province.clone()),
            ("district", self.district.clone()),
            ("ward", self.ward.clone()),
            ("address", self.address.clone()),
            ("weight", self.weight.to_string()),
        ]
    }
}

/// A fresh random alphanumeric reference for a shipment request.
fn shipment_reference() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHIPMENT_REFERENCE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shipgate_core::OrderItem;

    use super::*;

    fn pickup() -> ShopConfig {
        ShopConfig {
            carrier_warehouse_id: "wh-9".to_string(),
            address: "12 Lý Thường Kiệt".to_string(),
            province: "Hà Nội".to_string(),
            district: "Hoàn Kiếm".to_string(),
            ward: "Hàng Bài".to_string(),
            phone: "0241234567".to_string(),
            ..ShopConfig::default()
        }
    }

    fn order() -> Order {
        Order {
            items: vec![
                OrderItem {
                    title: "t1".to_string(),
                    quantity: 2,
                },
                OrderItem {
                    title: "t2".to_string(),
                    quantity: 1,
                },
            ],
            city: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            ward: "Bến Nghé".to_string(),
            address: "5 Lê Lợi".to_string(),
            note: "call first".to_string(),
            total: 250_000,
            ..Order::default()
        }
    }

    #[test]
    fn test_product_weight_in_kilograms() {
        let product = Product::new("Tea".to_string(), 2);
        assert!((product.weight - 0.3).abs() < 1e-9);
        assert_eq!(product.quantity, 2);
    }

    #[test]
    fn test_shipment_request_fields() {
        let customer = Customer {
            name: "Nguyễn Văn A".to_string(),
            phone: "0901234567".to_string(),
            city: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            ward: "Bến Nghé".to_string(),
            address: "5 Lê Lợi".to_string(),
        };
        let request = ShipmentRequest::new("Trà Shop", &pickup(), &customer, &order(), vec![]);

        assert_eq!(request.order.id.len(), SHIPMENT_REFERENCE_LEN);
        assert!(request.order.id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(request.order.pick_name, "Trà Shop");
        assert_eq!(request.order.pick_address_id, "wh-9");
        assert_eq!(request.order.pick_tel, "0241234567");
        assert_eq!(request.order.province, "Hồ Chí Minh");
        assert_eq!(request.order.tel, "0901234567");
        assert_eq!(request.order.is_freeship, "1");
        assert_eq!(request.order.pick_money, 250_000);
        assert_eq!(request.order.value, 0);
        assert_eq!(request.order.note, "call first");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["order"]["pick_province"], "Hà Nội");
        assert!(json["products"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_fee_query_weight_and_pairs() {
        let query = FeeQuery::new(&pickup(), &order());
        assert_eq!(query.weight, 450);

        let pairs = query.pairs();
        assert_eq!(pairs[0], ("pick_province", "Hà Nội".to_string()));
        assert_eq!(pairs[8], ("weight", "450".to_string()));
    }

    #[test]
    fn test_response_tolerates_missing_blocks() {
        let response: CarrierResponse =
            serde_json::from_str(r#"{"success":false,"message":"Token invalid"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.message, "Token invalid");
        assert!(response.order.label.is_empty());
        assert_eq!(response.fee.fee, 0);
    }
}
