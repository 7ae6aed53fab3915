//! Request decoding and action routing.
//!
//! A request is one string, `token|user[+]shop|action|params`. The dispatcher
//! decodes it, resolves the shop for the calling user and hands the request to
//! the handler for its action. Every outcome, including failures, is a
//! [`ResultEnvelope`].

use std::sync::Arc;

use secrecy::SecretString;
use shipgate_core::{Action, OrderId, ResultEnvelope, ShopId, UserId, UserSession};
use tracing::{debug, error, info, instrument, warn};

use crate::carrier::Carrier;
use crate::handlers::{self, ActionContext};
use crate::store::{OrderRepository, ShopDirectory, WebhookEventLog};
use crate::titles::TitleDecoder;

/// Separator between request fields.
const FIELD_SEPARATOR: char = '|';
/// Separator between user id and shop id in the second field.
const SHOP_SEPARATOR: &str = "[+]";

/// Decode a raw request.
///
/// Returns `None` when the request has fewer than three fields. Everything
/// after the third separator belongs to `params`, pipes included. A second
/// field without `[+]` yields an empty shop id.
#[must_use]
pub fn decode_request(raw: &str) -> Option<UserSession> {
    let mut fields = raw.splitn(4, FIELD_SEPARATOR);
    let token = fields.next()?;
    let identity = fields.next()?;
    let action = fields.next()?;
    let params = fields.next().unwrap_or_default();

    let (user_id, shop_id) = identity.split_once(SHOP_SEPARATOR).unwrap_or((identity, ""));

    Some(UserSession {
        session_token: SecretString::from(token),
        user_id: UserId::new(user_id),
        shop_id: ShopId::new(shop_id),
        action: Action::from_code(action),
        params: params.to_string(),
    })
}

/// Routes decoded requests to the action handlers.
///
/// Cheap to share behind an `Arc`; requests are handled independently and
/// concurrently.
pub struct Dispatcher<S, C> {
    store: S,
    carrier: C,
    titles: Arc<dyn TitleDecoder>,
}

impl<S, C> Dispatcher<S, C>
where
    S: ShopDirectory + OrderRepository + WebhookEventLog,
    C: Carrier,
{
    pub fn new(store: S, carrier: C, titles: Arc<dyn TitleDecoder>) -> Self {
        Self {
            store,
            carrier,
            titles,
        }
    }

    /// The store handlers read from and write to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Handle a raw request and return the encoded reply.
    ///
    /// A request with fewer than three fields gets an empty reply.
    pub async fn dispatch(&self, raw: &str) -> String {
        let Some(session) = decode_request(raw) else {
            debug!("Request has fewer than three fields, ignoring");
            return String::new();
        };
        self.handle(&session).await.encode()
    }

    /// Handle a decoded request.
    #[instrument(
        skip_all,
        fields(action = %session.action, user_id = %session.user_id, shop_id = %session.shop_id)
    )]
    pub async fn handle(&self, session: &UserSession) -> ResultEnvelope {
        let shop = match self.store.find_shop(&session.user_id, &session.shop_id).await {
            Ok(Some(shop)) if shop.is_enabled() => shop,
            Ok(_) => {
                info!("Shop is disabled or not accessible");
                return ResultEnvelope::shop_disabled();
            }
            Err(e) => {
                error!(error = %e, "Shop lookup failed");
                return ResultEnvelope::failure(handlers::STORE_FAILED);
            }
        };

        let ctx = ActionContext {
            store: &self.store,
            carrier: &self.carrier,
            titles: self.titles.as_ref(),
            shop: &shop,
        };
        let params = session.params.as_str();

        let result = match &session.action {
            Action::Submit => handlers::submit(&ctx, &OrderId::new(params)).await,
            Action::Print => handlers::print(&ctx, &OrderId::new(params)).await,
            Action::Cancel => handlers::cancel(&ctx, &OrderId::new(params)).await,
            Action::Quote => handlers::quote(&ctx, params).await,
            Action::ViewLog => handlers::view_log(&ctx, params).await,
            Action::Unknown(code) => {
                warn!(code = %code, "Unknown action");
                return ResultEnvelope::action_not_found();
            }
        };

        handlers::respond(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;
    use secrecy::ExposeSecret;
    use shipgate_core::{Order, ResultCode, ShipmentLabel, ShopStatus};
    use tokio::sync::Barrier;

    use super::*;
    use crate::carrier::{CarrierError, CarrierReply, FeeQuery, ShipmentRequest};
    use crate::handlers::testing::{ScriptedCarrier, order, shop, store_with};
    use crate::store::MemoryStore;
    use crate::titles::PlainTitles;

    const ACCEPTED: &[u8] = br#"{"success":true,"order":{"label":"ABC123","fee":"45000"}}"#;

    fn dispatcher(
        store: MemoryStore,
        carrier: ScriptedCarrier,
    ) -> Dispatcher<MemoryStore, ScriptedCarrier> {
        Dispatcher::new(store, carrier, Arc::new(PlainTitles))
    }

    fn decode(reply: &str) -> ResultEnvelope {
        serde_json::from_str(reply).unwrap()
    }

    #[test]
    fn test_decode_full_request() {
        let session = decode_request("tok|u1[+]s1|so|o1").unwrap();
        assert_eq!(session.session_token.expose_secret(), "tok");
        assert_eq!(session.user_id.as_str(), "u1");
        assert_eq!(session.shop_id.as_str(), "s1");
        assert_eq!(session.action, Action::Submit);
        assert_eq!(session.params, "o1");
    }

    #[test]
    fn test_decode_without_params() {
        let session = decode_request("tok|u1[+]s1|vl").unwrap();
        assert_eq!(session.action, Action::ViewLog);
        assert!(session.params.is_empty());
    }

    #[test]
    fn test_params_keep_later_pipes() {
        let session = decode_request(r#"tok|u1[+]s1|vs|{"note":"a|b"}"#).unwrap();
        assert_eq!(session.params, r#"{"note":"a|b"}"#);
    }

    #[test]
    fn test_identity_without_shop_separator() {
        let session = decode_request("tok|u1|so|o1").unwrap();
        assert_eq!(session.user_id.as_str(), "u1");
        assert!(session.shop_id.is_empty());
    }

    #[test]
    fn test_too_few_fields() {
        assert!(decode_request("tok|u1[+]s1").is_none());
        assert!(decode_request("").is_none());
    }

    proptest! {
        #[test]
        fn prop_fewer_than_three_fields_never_decode(raw in "[^|]*(\\|[^|]*)?") {
            prop_assert!(decode_request(&raw).is_none());
        }

        #[test]
        fn prop_params_are_everything_after_the_third_pipe(
            token in "[^|]*",
            identity in "[^|]*",
            action in "[^|]*",
            params in "\\PC*",
        ) {
            let session = decode_request(&format!("{token}|{identity}|{action}|{params}")).unwrap();
            prop_assert_eq!(session.params, params);
        }
    }

    #[tokio::test]
    async fn test_short_request_gets_empty_reply() {
        let dispatcher = dispatcher(store_with(order()), ScriptedCarrier::default());
        assert_eq!(dispatcher.dispatch("tok|u1[+]s1").await, "");
    }

    #[tokio::test]
    async fn test_disabled_shop_short_circuits() {
        let mut disabled = shop();
        disabled.status = ShopStatus::Disabled;
        let store = store_with(order()).with_shop(disabled);
        let dispatcher = dispatcher(store, ScriptedCarrier::default());

        for action in ["so", "po", "co", "vs", "vl"] {
            let reply = decode(&dispatcher.dispatch(&format!("tok|u1[+]s1|{action}|o1")).await);

            assert_eq!(reply, ResultEnvelope::shop_disabled(), "{action}");
            assert_eq!(reply.message, "Shop is disabled.");
        }
        assert!(dispatcher.carrier.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_or_shop_is_disabled() {
        let dispatcher = dispatcher(store_with(order()), ScriptedCarrier::default());

        for raw in ["tok|u2[+]s1|so|o1", "tok|u1[+]s9|so|o1", "tok|u1|so|o1"] {
            let reply = decode(&dispatcher.dispatch(raw).await);
            assert_eq!(reply.code, ResultCode::ShopDisabled, "{raw}");
        }
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let dispatcher = dispatcher(store_with(order()), ScriptedCarrier::default());

        let reply = decode(&dispatcher.dispatch("tok|u1[+]s1|zz|o1").await);

        assert_eq!(reply, ResultEnvelope::action_not_found());
        assert_eq!(reply.code.as_str(), "-5");
    }

    #[tokio::test]
    async fn test_submit_then_resubmit() {
        let dispatcher = dispatcher(store_with(order()), ScriptedCarrier::replying(&[ACCEPTED]));

        let first = decode(&dispatcher.dispatch("tok|u1[+]s1|so|o1").await);
        assert!(first.is_success());
        let order: Order = serde_json::from_str(&first.data_b).unwrap();
        assert_eq!(order.shipment_code.as_str(), "ABC123");
        assert_eq!(order.partner_ship_fee, 45_000);

        let second = decode(&dispatcher.dispatch("tok|u1[+]s1|so|o1").await);
        assert_eq!(second, ResultEnvelope::failure("Already Submit!"));
    }

    #[tokio::test]
    async fn test_routes_every_action() {
        let dispatcher = dispatcher(
            store_with(order()),
            ScriptedCarrier::replying(&[
                ACCEPTED,
                b"%PDF",
                br#"{"success":true}"#,
                br#"{"success":true,"fee":{"fee":30000}}"#,
            ]),
        );

        let replies = [
            "tok|u1[+]s1|so|o1",
            "tok|u1[+]s1|po|o1",
            "tok|u1[+]s1|co|o1",
            r#"tok|u1[+]s1|vs|{"items":[{"title":"a","quantity":1}],"city":"Huế","district":"Phú Hội"}"#,
            "tok|u1[+]s1|vl|ABC123",
        ];
        for raw in replies {
            let reply = decode(&dispatcher.dispatch(raw).await);
            assert!(reply.is_success(), "{raw}: {reply:?}");
        }
        assert_eq!(dispatcher.carrier.calls().len(), 4);
    }

    /// Holds every create call until `parties` of them are in flight.
    struct GatedCarrier {
        gate: Barrier,
        inner: ScriptedCarrier,
    }

    impl Carrier for GatedCarrier {
        async fn create_shipment(
            &self,
            token: &SecretString,
            request: &ShipmentRequest,
        ) -> Result<CarrierReply, CarrierError> {
            self.gate.wait().await;
            self.inner.create_shipment(token, request).await
        }

        async fn fetch_label(
            &self,
            token: &SecretString,
            label: &ShipmentLabel,
        ) -> Result<CarrierReply, CarrierError> {
            self.inner.fetch_label(token, label).await
        }

        async fn cancel_shipment(
            &self,
            token: &SecretString,
            label: &ShipmentLabel,
        ) -> Result<CarrierReply, CarrierError> {
            self.inner.cancel_shipment(token, label).await
        }

        async fn quote_fee(
            &self,
            token: &SecretString,
            query: &FeeQuery,
        ) -> Result<CarrierReply, CarrierError> {
            self.inner.quote_fee(token, query).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_submissions_both_reach_carrier() {
        let carrier = GatedCarrier {
            gate: Barrier::new(2),
            inner: ScriptedCarrier::replying(&[
                br#"{"success":true,"order":{"label":"L-A","fee":"1"}}"#,
                br#"{"success":true,"order":{"label":"L-B","fee":"2"}}"#,
            ]),
        };
        let dispatcher = Arc::new(Dispatcher::new(
            store_with(order()),
            carrier,
            Arc::new(PlainTitles),
        ));

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move { dispatcher.dispatch("tok|u1[+]s1|so|o1").await })
            })
            .collect();
        for task in tasks {
            let reply = decode(&task.await.expect("task panicked"));
            assert!(reply.is_success());
        }

        // No lock guards submission: both calls passed validation.
        assert_eq!(dispatcher.carrier.inner.calls().len(), 2);
        let saved = dispatcher
            .store()
            .order(&ShopId::new("s1"), &OrderId::new("o1"))
            .await
            .unwrap();
        assert!(["L-A", "L-B"].contains(&saved.shipment_code.as_str()));
    }
}
