//! HTTP implementation of the carrier API.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use shipgate_core::ShipmentLabel;
use tracing::{debug, instrument};
use url::Url;

use super::{Carrier, CarrierError, CarrierReply, FeeQuery, ShipmentRequest};
use crate::config::CarrierConfig;

/// Header carrying the shop's carrier token.
const TOKEN_HEADER: &str = "Token";

/// Carrier API client over reqwest.
///
/// Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct HttpCarrier {
    inner: Arc<HttpCarrierInner>,
}

struct HttpCarrierInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpCarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCarrier")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpCarrier {
    /// Create a client for the configured carrier.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CarrierConfig) -> Result<Self, CarrierError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpCarrierInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// The API root endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL below the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CarrierError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CarrierError::Endpoint(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a prepared request and collect its body.
    ///
    /// The HTTP status is not interpreted; the carrier reports failures in
    /// its envelope.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<CarrierReply, CarrierError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(status = status.as_u16(), body_len = body.len(), "Carrier responded");

        CarrierReply::from_body(body.to_vec())
    }
}

impl Carrier for HttpCarrier {
    #[instrument(skip(self, token, request), fields(reference = %request.order.id))]
    async fn create_shipment(
        &self,
        token: &SecretString,
        request: &ShipmentRequest,
    ) -> Result<CarrierReply, CarrierError> {
        let url = self.endpoint(&["services", "shipment", "order"])?;
        let request = self
            .inner
            .client
            .post(url)
            .header(TOKEN_HEADER, token.expose_secret())
            .json(request);
        self.send(request).await
    }

    #[instrument(skip(self, token), fields(label = %label))]
    async fn fetch_label(
        &self,
        token: &SecretString,
        label: &ShipmentLabel,
    ) -> Result<CarrierReply, CarrierError> {
        let url = self.endpoint(&["services", "label", label.as_str()])?;
        let request = self
            .inner
            .client
            .get(url)
            .header(TOKEN_HEADER, token.expose_secret());
        self.send(request).await
    }

    #[instrument(skip(self, token), fields(label = %label))]
    async fn cancel_shipment(
        &self,
        token: &SecretString,
        label: &ShipmentLabel,
    ) -> Result<CarrierReply, CarrierError> {
        let url = self.endpoint(&["services", "shipment", "cancel", label.as_str()])?;
        let request = self
            .inner
            .client
            .post(url)
            .header(TOKEN_HEADER, token.expose_secret());
        self.send(request).await
    }

    #[instrument(skip(self, token, query), fields(weight = query.weight))]
    async fn quote_fee(
        &self,
        token: &SecretString,
        query: &FeeQuery,
    ) -> Result<CarrierReply, CarrierError> {
        let mut url = self.endpoint(&["services", "shipment", "fee"])?;
        url.query_pairs_mut().extend_pairs(query.pairs());
        let request = self
            .inner
            .client
            .post(url)
            .header(TOKEN_HEADER, token.expose_secret());
        self.send(request).await
    }
}
