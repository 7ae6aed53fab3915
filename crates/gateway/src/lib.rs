//! Shipgate gateway - shipment fulfillment between order management and the
//! logistics carrier.
//!
//! # Architecture
//!
//! - [`dispatch`] decodes `token|user[+]shop|action|params` requests and
//!   routes them by action code
//! - [`handlers`] implement submit, print, cancel, quote and view-log
//! - [`validate`] holds the per-action precondition checks
//! - [`carrier`] talks to the carrier's HTTP API
//! - [`store`] defines the ports to shop, order and webhook event data
//! - [`server`] exposes the dispatcher over axum
//!
//! Every request yields a [`shipgate_core::ResultEnvelope`]; failures are
//! reported in the envelope, never as transport errors.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod carrier;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod server;
pub mod store;
pub mod titles;
pub mod validate;

pub use dispatch::{Dispatcher, decode_request};
