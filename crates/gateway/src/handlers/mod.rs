//! One handler per action.
//!
//! Each handler loads what it needs through the store ports, validates it,
//! calls the carrier and answers with a [`ResultEnvelope`]. Failures travel
//! as [`ActionError`] and are turned into an envelope by [`respond`]; nothing
//! escapes a handler as an error.

mod cancel;
mod print;
mod quote;
mod submit;
mod view_log;

pub use cancel::cancel;
pub use print::print;
pub use quote::quote;
pub use submit::submit;
pub use view_log::view_log;

use shipgate_core::{ResultEnvelope, Shop};
use thiserror::Error;
use tracing::{error, warn};

use crate::carrier::CarrierError;
use crate::store::StoreError;
use crate::titles::TitleDecoder;
use crate::validate::ValidationError;

pub(crate) const SUBMIT_FAILED: &str = "Submit fail!";
/// Label fetch failures answer with the submit failure text.
pub(crate) const PRINT_FAILED: &str = SUBMIT_FAILED;
pub(crate) const CANCEL_FAILED: &str = "Cancel partner order fail!";
pub(crate) const QUOTE_FAILED: &str = "Get ship fee fail!";
pub(crate) const PAYLOAD_INVALID: &str = "ord parse fail";
pub(crate) const STORE_FAILED: &str = "Service unavailable!";

/// Everything a handler may touch for one request.
pub struct ActionContext<'a, S, C> {
    pub store: &'a S,
    pub carrier: &'a C,
    pub titles: &'a dyn TitleDecoder,
    /// The authorized, enabled shop the request acts for.
    pub shop: &'a Shop,
}

/// Why an action did not succeed.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A precondition failed; the message is caller-facing.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A store port failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The carrier call failed. `failure` is the caller-facing prefix.
    #[error("{failure} ({source})")]
    Carrier {
        failure: &'static str,
        #[source]
        source: CarrierError,
    },

    /// Request params are not a valid order payload.
    #[error("invalid order payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// The updated order could not be encoded for the reply.
    #[error("order encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ActionError {
    /// Attach the caller-facing message for a failed carrier call.
    pub(crate) fn carrier(failure: &'static str) -> impl FnOnce(CarrierError) -> Self {
        move |source| Self::Carrier { failure, source }
    }

    /// The envelope a caller sees for this failure.
    #[must_use]
    pub fn into_envelope(self) -> ResultEnvelope {
        match self {
            Self::Invalid(e) => ResultEnvelope::failure(e.to_string()),
            Self::Store(e) => {
                error!(error = %e, "Store failure while handling action");
                ResultEnvelope::failure(STORE_FAILED)
            }
            Self::Carrier { failure, source } => {
                warn!(error = %source, "Carrier call failed");
                match source {
                    CarrierError::Rejected(message) => {
                        ResultEnvelope::failure(format!("{failure} {message}"))
                    }
                    _ => ResultEnvelope::failure(failure),
                }
            }
            Self::Payload(e) => {
                warn!(error = %e, "Could not parse order payload");
                ResultEnvelope::failure(PAYLOAD_INVALID)
            }
            Self::Encode(e) => {
                error!(error = %e, "Could not encode submitted order");
                ResultEnvelope::failure(SUBMIT_FAILED)
            }
        }
    }
}

/// Collapse a handler result into the envelope sent back.
#[must_use]
pub fn respond(result: Result<ResultEnvelope, ActionError>) -> ResultEnvelope {
    result.unwrap_or_else(ActionError::into_envelope)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod testing {
    //! Scripted carrier and fixtures shared by the handler tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use secrecy::{ExposeSecret, SecretString};
    use shipgate_core::{
        Customer, Order, OrderId, OrderItem, ShipmentLabel, Shop, ShopConfig, ShopId,
        ShopStatus, UserId,
    };

    use crate::carrier::{Carrier, CarrierError, CarrierReply, FeeQuery, ShipmentRequest};
    use crate::store::MemoryStore;

    /// A call the scripted carrier received.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Create { token: String, request: ShipmentRequest },
        Label(String),
        Cancel(String),
        Quote(FeeQuery),
    }

    /// Carrier that answers from a queue of canned bodies.
    #[derive(Default)]
    pub struct ScriptedCarrier {
        replies: Mutex<VecDeque<Result<Vec<u8>, ()>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedCarrier {
        pub fn replying(bodies: &[&[u8]]) -> Self {
            let carrier = Self::default();
            for body in bodies {
                carrier.push(Ok(body.to_vec()));
            }
            carrier
        }

        /// The next call fails as if the network were down.
        pub fn unreachable() -> Self {
            let carrier = Self::default();
            carrier.push(Err(()));
            carrier
        }

        fn push(&self, reply: Result<Vec<u8>, ()>) {
            self.replies.lock().unwrap().push_back(reply);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: Call) -> Result<CarrierReply, CarrierError> {
            self.calls.lock().unwrap().push(call);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted carrier ran out of replies");
            match next {
                Ok(body) => CarrierReply::from_body(body),
                Err(()) => Err(CarrierError::Endpoint("unreachable".to_string())),
            }
        }
    }

    impl Carrier for ScriptedCarrier {
        async fn create_shipment(
            &self,
            token: &SecretString,
            request: &ShipmentRequest,
        ) -> Result<CarrierReply, CarrierError> {
            self.answer(Call::Create {
                token: token.expose_secret().to_string(),
                request: request.clone(),
            })
        }

        async fn fetch_label(
            &self,
            _token: &SecretString,
            label: &ShipmentLabel,
        ) -> Result<CarrierReply, CarrierError> {
            self.answer(Call::Label(label.to_string()))
        }

        async fn cancel_shipment(
            &self,
            _token: &SecretString,
            label: &ShipmentLabel,
        ) -> Result<CarrierReply, CarrierError> {
            self.answer(Call::Cancel(label.to_string()))
        }

        async fn quote_fee(
            &self,
            _token: &SecretString,
            query: &FeeQuery,
        ) -> Result<CarrierReply, CarrierError> {
            self.answer(Call::Quote(query.clone()))
        }
    }

    pub fn shop() -> Shop {
        Shop {
            id: ShopId::new("s1"),
            name: "Trà Shop".to_string(),
            status: ShopStatus::Enabled,
            config: ShopConfig {
                carrier_warehouse_id: "wh-9".to_string(),
                address: "12 Lý Thường Kiệt".to_string(),
                province: "Hà Nội".to_string(),
                district: "Hoàn Kiếm".to_string(),
                ward: "Hàng Bài".to_string(),
                phone: "0241234567".to_string(),
                carrier_auth_token: SecretString::from("shop-token"),
            },
        }
    }

    pub fn customer() -> Customer {
        Customer {
            name: "Nguyễn Văn A".to_string(),
            phone: "0901234567".to_string(),
            city: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            ward: "Bến Nghé".to_string(),
            address: "5 Lê Lợi".to_string(),
        }
    }

    pub fn order() -> Order {
        Order {
            id: OrderId::new("o1"),
            items: vec![OrderItem {
                title: "Trà xanh".to_string(),
                quantity: 2,
            }],
            phone: "0901234567".to_string(),
            address: "5 Lê Lợi".to_string(),
            city: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            total: 250_000,
            ..Order::default()
        }
    }

    pub fn submitted_order() -> Order {
        let mut order = order();
        order.mark_submitted(ShipmentLabel::new("S1.A1"), 30_000);
        order
    }

    pub fn store_with(order: Order) -> MemoryStore {
        let shop = shop();
        MemoryStore::new()
            .with_grant(UserId::new("u1"), shop.id.clone())
            .with_customer(shop.id.clone(), customer())
            .with_order(shop.id.clone(), order)
            .with_shop(shop)
    }
}
