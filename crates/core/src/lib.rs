//! Shipgate Core - Shared domain types.
//!
//! This crate provides the types shared by the gateway and its tests:
//! - orders, customers and shops as owned by the storage collaborator
//! - the per-request [`UserSession`] and its [`Action`]
//! - the uniform [`ResultEnvelope`] answered to callers
//! - stored carrier webhook events and the carrier status table
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
