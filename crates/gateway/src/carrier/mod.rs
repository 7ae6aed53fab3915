//! Logistics carrier API client.
//!
//! Four operations are exposed through the [`Carrier`] trait, each a single
//! outbound call with no retry:
//!
//! - create a shipment (`POST services/shipment/order`)
//! - fetch a printable label (`GET services/label/{code}`)
//! - cancel a shipment (`POST services/shipment/cancel/{code}`)
//! - quote a fee (`POST services/shipment/fee`)
//!
//! # Failure model
//!
//! A call either fails before a body is available ([`CarrierError::Transport`],
//! [`CarrierError::EmptyBody`]) or yields a [`CarrierReply`]. The reply keeps the
//! raw body next to the parse result, and the caller picks how to read it:
//! [`CarrierReply::strict`] fails on a malformed envelope, while
//! [`CarrierReply::lenient`] logs and continues with a zero-valued envelope.
//! Both surface `success: false` as [`CarrierError::Rejected`].
//!
//! The lenient path exists because label downloads are not JSON, and because
//! read-only actions have always proceeded on unparseable bodies. It can hide a
//! broken carrier response, so only use it where that is acceptable.

mod client;
mod types;

use std::future::Future;

use secrecy::SecretString;
use shipgate_core::ShipmentLabel;
use thiserror::Error;
use tracing::warn;

pub use client::HttpCarrier;
pub use types::*;

/// Errors that can occur when talking to the carrier.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// The request never produced a response body.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint URL could not be built from the configured base.
    #[error("Invalid carrier endpoint: {0}")]
    Endpoint(String),

    /// The carrier answered with an empty body.
    #[error("Empty response body")]
    EmptyBody,

    /// The body is not a carrier envelope.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The carrier parsed the request and refused it.
    #[error("Rejected by carrier: {0}")]
    Rejected(String),
}

/// A non-empty carrier response body and its parse result.
#[derive(Debug)]
pub struct CarrierReply {
    body: Vec<u8>,
    parsed: Result<CarrierResponse, String>,
}

impl CarrierReply {
    /// Wrap a response body.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::EmptyBody` if the body is empty.
    pub fn from_body(body: Vec<u8>) -> Result<Self, CarrierError> {
        if body.is_empty() {
            return Err(CarrierError::EmptyBody);
        }
        let parsed = serde_json::from_slice(&body).map_err(|e| e.to_string());
        Ok(Self { body, parsed })
    }

    /// Raw body bytes as received.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Read the envelope, failing on anything unparseable.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for an unparseable body and `Rejected` when the
    /// carrier reports `success: false`.
    pub fn strict(&self) -> Result<CarrierResponse, CarrierError> {
        let response = self
            .parsed
            .clone()
            .map_err(CarrierError::Malformed)?;
        accept(response)
    }

    /// Read the envelope, continuing with a zero-valued one if unparseable.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when a parsed envelope reports `success: false`.
    pub fn lenient(&self) -> Result<CarrierResponse, CarrierError> {
        match &self.parsed {
            Ok(response) => accept(response.clone()),
            Err(reason) => {
                warn!(
                    reason = %reason,
                    body_len = self.body.len(),
                    "Carrier body is not an envelope, continuing with defaults"
                );
                Ok(CarrierResponse::default())
            }
        }
    }
}

fn accept(response: CarrierResponse) -> Result<CarrierResponse, CarrierError> {
    if response.success {
        Ok(response)
    } else {
        Err(CarrierError::Rejected(response.message))
    }
}

/// Operations the gateway performs against the carrier.
///
/// Every call authenticates with the shop's own carrier token.
pub trait Carrier: Send + Sync {
    fn create_shipment(
        &self,
        token: &SecretString,
        request: &ShipmentRequest,
    ) -> impl Future<Output = Result<CarrierReply, CarrierError>> + Send;

    /// The reply body is the label artifact itself.
    fn fetch_label(
        &self,
        token: &SecretString,
        label: &ShipmentLabel,
    ) -> impl Future<Output = Result<CarrierReply, CarrierError>> + Send;

    fn cancel_shipment(
        &self,
        token: &SecretString,
        label: &ShipmentLabel,
    ) -> impl Future<Output = Result<CarrierReply, CarrierError>> + Send;

    fn quote_fee(
        &self,
        token: &SecretString,
        query: &FeeQuery,
    ) -> impl Future<Output = Result<CarrierReply, CarrierError>> + Send;
}
