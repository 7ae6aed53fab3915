//! HTTP transport for the dispatcher.
//!
//! `POST /rpc` takes the raw request string as its body and answers with the
//! encoded envelope, always with status 200. Callers read the outcome from the
//! envelope's `code`, never from the HTTP status.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tracing::debug;

use crate::carrier::Carrier;
use crate::dispatch::Dispatcher;
use crate::store::{OrderRepository, ShopDirectory, WebhookEventLog};

/// Build the gateway routes.
pub fn router<S, C>(dispatcher: Arc<Dispatcher<S, C>>) -> Router
where
    S: ShopDirectory + OrderRepository + WebhookEventLog + 'static,
    C: Carrier + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/rpc", post(rpc::<S, C>))
        .with_state(dispatcher)
}

async fn rpc<S, C>(State(dispatcher): State<Arc<Dispatcher<S, C>>>, body: String) -> String
where
    S: ShopDirectory + OrderRepository + WebhookEventLog + 'static,
    C: Carrier + 'static,
{
    debug!(len = body.len(), "RPC request received");
    dispatcher.dispatch(&body).await
}

/// Liveness check. Does not touch the store or the carrier.
async fn health() -> &'static str {
    "ok"
}
