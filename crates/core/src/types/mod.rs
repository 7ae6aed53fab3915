//! Domain types for the fulfillment gateway.
//!
//! This module provides type-safe wrappers for the records the gateway reads
//! from its collaborators and the envelope it answers with.

pub mod envelope;
pub mod id;
pub mod order;
pub mod session;
pub mod shop;
pub mod status;
pub mod webhook;

pub use envelope::{ResultCode, ResultEnvelope};
pub use id::*;
pub use order::{Customer, GRAMS_PER_UNIT, Order, OrderItem};
pub use session::{Action, UserSession};
pub use shop::{Shop, ShopConfig, ShopStatus};
pub use status::status_text;
pub use webhook::{LOG_TIME_FORMAT, StatusUpdate, WebhookEvent};
