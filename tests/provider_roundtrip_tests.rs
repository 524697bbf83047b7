//! Drives `AnyPayClient` over real HTTP against a local stand-in for the provider.

use anypay::api::{PaymentsFilter, PayoutRequest};
use anypay::core::kernel::DigestAlgorithm;
use anypay::{AnyPayBuilder, AnyPayClient, AnyPayConfig, AnyPayError};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Provider {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

#[derive(Debug, Clone)]
struct SeenRequest {
    method: String,
    api_id: String,
    query: HashMap<String, String>,
    accept: Option<String>,
    content_type: Option<String>,
}

async fn provider_endpoint(
    State(provider): State<Provider>,
    Path((method, api_id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    provider.seen.lock().unwrap().push(SeenRequest {
        method: method.clone(),
        api_id,
        query,
        accept: header("accept"),
        content_type: header("content-type"),
    });

    let body = match method.as_str() {
        "balance" => json!({"result": {"balance": "42.5"}}),
        "rates" => json!({"result": {"deposit": {"btc": "3500000.5"}, "withdraw": {"btc": "3400000"}}}),
        "ip-notification" => json!({"result": {"ip": "185.162.128.38,185.162.128.39"}}),
        "payments" => json!({"result": {"total": 1, "payments": {"7": {
            "transaction_id": 7,
            "pay_id": "order-7",
            "status": "waiting",
            "amount": "99.90",
            "currency": "RUB"
        }}}}),
        "create-payout" => json!({"error": {"message": "Insufficient balance", "code": "63"}}),
        _ => json!({}),
    };
    Json(body)
}

async fn start_provider() -> (Provider, String) {
    let provider = Provider::default();
    let app = Router::new()
        .route("/api/{method}/{api_id}", get(provider_endpoint))
        .with_state(provider.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (provider, format!("http://{}/api", addr))
}

fn client_for(api_url: &str) -> AnyPayClient {
    AnyPayBuilder::new(
        AnyPayConfig::new("1234", "api-key", "secret")
            .project_id(77)
            .api_url(api_url),
    )
    .with_timeout(5)
    .build()
    .unwrap()
}

#[tokio::test]
async fn test_balance_over_http() {
    let (provider, api_url) = start_provider().await;
    let client = client_for(&api_url);

    let balance = client.get_balance().await.unwrap();
    assert_eq!(balance, Decimal::from_str("42.5").unwrap());

    let seen = provider.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "balance");
    assert_eq!(seen[0].api_id, "1234");
    assert_eq!(seen[0].accept.as_deref(), Some("application/json"));
    assert_eq!(
        seen[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        seen[0].query.get("sign"),
        Some(&DigestAlgorithm::Sha256.hex_digest("balance1234api-key"))
    );
}

#[tokio::test]
async fn test_payments_filters_travel_in_query() {
    let (provider, api_url) = start_provider().await;
    let client = client_for(&api_url);

    let list = client
        .get_payments(None, &PaymentsFilter::new().pay_id("order 7&x"))
        .await
        .unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.payments["7"].pay_id, "order-7");

    let seen = provider.seen.lock().unwrap().clone();
    assert_eq!(seen[0].query.get("project_id").map(String::as_str), Some("77"));
    assert_eq!(seen[0].query.get("pay_id").map(String::as_str), Some("order 7&x"));
    assert_eq!(
        seen[0].query.get("sign"),
        Some(&DigestAlgorithm::Sha256.hex_digest("payments123477api-key"))
    );
}

#[tokio::test]
async fn test_payout_rejection_is_application_error() {
    let (_provider, api_url) = start_provider().await;
    let client = client_for(&api_url);

    let payout = PayoutRequest::new("p-9", "card", Decimal::from_str("500").unwrap(), "4111");
    match client.create_payout(&payout).await.unwrap_err() {
        AnyPayError::ApiError { code, message } => {
            assert_eq!(code, 63);
            assert_eq!(message, "Insufficient balance");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_method_body_is_protocol_violation() {
    let (_provider, api_url) = start_provider().await;
    let client = client_for(&api_url);

    let err = client.call("no-such-method", Vec::new()).await.unwrap_err();
    assert!(matches!(err, AnyPayError::ProtocolViolation(_)));
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let (provider, api_url) = start_provider().await;
    let client = Arc::new(client_for(&api_url));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    client.get_balance().await.map(|_| ())
                } else {
                    client.get_rates().await.map(|_| ())
                }
            })
        })
        .collect();

    for outcome in futures::future::join_all(tasks).await {
        outcome.unwrap().unwrap();
    }

    assert_eq!(provider.seen.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn test_service_ip_feeds_allow_list() {
    let (_provider, api_url) = start_provider().await;
    let client = client_for(&api_url);

    let addresses = client.get_service_ip().await.unwrap().addresses();
    assert_eq!(addresses.len(), 2);

    let config = anypay::CallbackConfig::new("/anypay", 0).with_allowed_ips(addresses);
    assert_eq!(config.allowed_ips.len(), 2);
}

#[tokio::test]
async fn test_non_json_body_is_transport_error() {
    let app = Router::new().route("/api/{method}/{api_id}", get(|| async { "<html>oops</html>" }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = client_for(&format!("http://{}/api", addr));
    let err = client.get_balance().await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {:?}", err);
}
