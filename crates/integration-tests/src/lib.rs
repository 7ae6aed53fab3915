//! Integration test harness for the Shipgate gateway.
//!
//! Tests run the real gateway router and the reqwest carrier client against a
//! mock carrier served by axum on an ephemeral local port. Nothing outside
//! the test process is contacted.
//!
//! - [`MockCarrier`] records every request and answers with canned bodies
//! - [`TestGateway`] serves the gateway against a [`MockCarrier`]
//! - [`fixtures`] builds a store with one shop, customer and order

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use shipgate_core::ResultEnvelope;
use shipgate_gateway::Dispatcher;
use shipgate_gateway::carrier::HttpCarrier;
use shipgate_gateway::config::CarrierConfig;
use shipgate_gateway::server;
use shipgate_gateway::store::MemoryStore;
use shipgate_gateway::titles::PlainTitles;
use url::Url;

/// A request as the mock carrier saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    /// Value of the `Token` header.
    pub token: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Decoded query-string pairs.
    #[must_use]
    pub fn query_pairs(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Carrier API stand-in bound to `127.0.0.1:0`.
///
/// Replies are keyed by exact request path. Unscripted paths get a 404 with
/// an empty body.
pub struct MockCarrier {
    addr: SocketAddr,
    state: MockState,
}

impl MockCarrier {
    /// Bind and serve in the background.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock carrier");
        let addr = listener.local_addr().expect("mock carrier has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock carrier stopped");
        });

        Self { addr, state }
    }

    /// Root URL to configure the carrier client with.
    ///
    /// # Panics
    ///
    /// Panics if the address does not form a URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("mock carrier URL")
    }

    /// Answer requests to `path` with `body`.
    ///
    /// # Panics
    ///
    /// Panics if the reply table lock is poisoned.
    pub fn reply(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.state
            .replies
            .lock()
            .expect("reply table poisoned")
            .insert(path.to_string(), body.into());
    }

    /// Every request received so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("request log poisoned")
            .clone()
    }

    /// Carrier client config pointing at this mock.
    #[must_use]
    pub fn config(&self) -> CarrierConfig {
        CarrierConfig {
            base_url: self.base_url(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[allow(clippy::significant_drop_tightening)]
async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    let path = uri.path().to_string();
    let token = headers
        .get("Token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    state
        .requests
        .lock()
        .expect("request log poisoned")
        .push(RecordedRequest {
            method,
            path: path.clone(),
            query: uri.query().map(str::to_string),
            token,
            body,
        });

    let reply = state
        .replies
        .lock()
        .expect("reply table poisoned")
        .get(&path)
        .cloned();
    reply.map_or_else(|| (StatusCode::NOT_FOUND, Vec::new()), |body| (StatusCode::OK, body))
}

/// The gateway router served on a local port, talking to a mock carrier.
pub struct TestGateway {
    pub carrier: MockCarrier,
    pub dispatcher: Arc<Dispatcher<MemoryStore, HttpCarrier>>,
    url: String,
    client: reqwest::Client,
}

impl TestGateway {
    /// Serve `store` with a fresh mock carrier.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot be started.
    pub async fn start(store: MemoryStore) -> Self {
        let carrier = MockCarrier::start().await;
        let http_carrier =
            HttpCarrier::new(&carrier.config()).expect("Failed to build carrier client");
        let dispatcher = Arc::new(Dispatcher::new(store, http_carrier, Arc::new(PlainTitles)));
        let app = server::router(Arc::clone(&dispatcher));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind gateway");
        let addr = listener.local_addr().expect("gateway has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("gateway stopped");
        });

        Self {
            carrier,
            dispatcher,
            url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    /// Post a raw request and return the raw reply body.
    ///
    /// # Panics
    ///
    /// Panics on transport errors or a non-200 status.
    pub async fn rpc_raw(&self, request: &str) -> String {
        let response = self
            .client
            .post(format!("{}/rpc", self.url))
            .body(request.to_string())
            .send()
            .await
            .expect("rpc request failed");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.text().await.expect("rpc body unreadable")
    }

    /// Post a raw request and decode the envelope.
    ///
    /// # Panics
    ///
    /// Panics if the reply is not an envelope.
    pub async fn rpc(&self, request: &str) -> ResultEnvelope {
        let body = self.rpc_raw(request).await;
        serde_json::from_str(&body).unwrap_or_else(|e| panic!("not an envelope ({e}): {body}"))
    }

    /// `GET` a path on the gateway.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.url))
            .send()
            .await
            .expect("gateway request failed")
    }
}

pub mod fixtures {
    //! A store holding one enabled shop (`s1`, user `u1`), one customer and
    //! one unsubmitted order (`o1`, two items totalling three units).

    use secrecy::SecretString;
    use shipgate_core::{
        Customer, Order, OrderId, OrderItem, Shop, ShopConfig, ShopId, ShopStatus, UserId,
    };
    use shipgate_gateway::store::MemoryStore;

    pub const SHOP_TOKEN: &str = "shop-token";
    pub const CUSTOMER_PHONE: &str = "0901234567";

    #[must_use]
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
                carrier_auth_token: SecretString::from(SHOP_TOKEN),
            },
        }
    }

    #[must_use]
    pub fn customer() -> Customer {
        Customer {
            name: "Nguyễn Văn A".to_string(),
            phone: CUSTOMER_PHONE.to_string(),
            city: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            ward: "Bến Nghé".to_string(),
            address: "5 Lê Lợi".to_string(),
        }
    }

    #[must_use]
    pub fn order() -> Order {
        Order {
            id: OrderId::new("o1"),
            items: vec![
                OrderItem {
                    title: "Trà xanh".to_string(),
                    quantity: 2,
                },
                OrderItem {
                    title: "Bánh pía".to_string(),
                    quantity: 1,
                },
            ],
            phone: CUSTOMER_PHONE.to_string(),
            address: "5 Lê Lợi".to_string(),
            city: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            ward: "Bến Nghé".to_string(),
            note: "Gọi trước khi giao".to_string(),
            total: 250_000,
            search_index: "o1 nguyen van a".to_string(),
            ..Order::default()
        }
    }

    #[must_use]
    pub fn store() -> MemoryStore {
        let shop = shop();
        MemoryStore::new()
            .with_grant(UserId::new("u1"), shop.id.clone())
            .with_customer(shop.id.clone(), customer())
            .with_order(shop.id.clone(), order())
            .with_shop(shop)
    }
}
