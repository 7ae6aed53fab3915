//! Carrier status callbacks as recorded by the webhook event store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ShipmentLabel;

/// Format used for timestamps in reconstructed status logs.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One stored callback, keyed by shipment label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub label: ShipmentLabel,
    /// JSON body of the callback exactly as the carrier posted it.
    pub raw_payload: String,
    /// When the callback was received, in carrier-local time.
    pub timestamp: NaiveDateTime,
}

impl WebhookEvent {
    /// Decode the stored payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the payload is not a status update.
    pub fn status_update(&self) -> Result<StatusUpdate, serde_json::Error> {
        serde_json::from_str(&self.raw_payload)
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM`.
    #[must_use]
    pub fn log_time(&self) -> String {
        self.timestamp.format(LOG_TIME_FORMAT).to_string()
    }
}

/// The parts of a carrier status callback the gateway reads.
///
/// Callbacks arrive as JSON or as form posts re-encoded as JSON, so every
/// other field may be a number, a string or `null` and is ignored.
/// `status_id` and `reason` accept a string, a number or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct StatusUpdate {
    #[serde(deserialize_with = "deserialize_loose_string")]
    pub status_id: String,
    #[serde(deserialize_with = "deserialize_loose_string")]
    pub reason: String,
}

fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
