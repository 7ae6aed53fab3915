//! Shops and their carrier configuration.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use super::id::ShopId;

/// Whether a shop may use the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShopStatus {
    Enabled,
    #[default]
    Disabled,
}

/// A merchant shop, as resolved by the shop directory.
///
/// Read-only to the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    #[serde(default)]
    pub status: ShopStatus,
    #[serde(default)]
    pub config: ShopConfig,
}

impl Shop {
    /// Whether the shop is allowed to dispatch actions.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status == ShopStatus::Enabled
    }
}

/// Pickup point and carrier credentials for a shop.
///
/// The carrier token is kept in a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    /// Warehouse id registered with the carrier.
    #[serde(default)]
    pub carrier_warehouse_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub carrier_auth_token: SecretString,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            carrier_warehouse_id: String::new(),
            address: String::new(),
            province: String::new(),
            district: String::new(),
            ward: String::new(),
            phone: String::new(),
            carrier_auth_token: empty_secret(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_missing_status_means_disabled() {
        let shop: Shop = serde_json::from_str(r#"{"id":"s1","name":"Shop"}"#).unwrap();
        assert_eq!(shop.status, ShopStatus::Disabled);
        assert!(!shop.is_enabled());
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let shop: Shop = serde_json::from_str(
            r#"{"id":"s1","name":"Shop","status":"enabled",
                "config":{"province":"Hà Nội","carrier_auth_token":"tok-very-secret"}}"#,
        )
        .unwrap();

        assert!(shop.is_enabled());
        assert_eq!(shop.config.carrier_auth_token.expose_secret(), "tok-very-secret");

        let debug_output = format!("{:?}", shop.config);
        assert!(debug_output.contains("Hà Nội"));
        assert!(!debug_output.contains("tok-very-secret"));
    }
}
