//! End-to-end tests: a real server on an ephemeral port, driven over HTTP.
//!
//! Each test gets its own temporary data directory seeded with the default
//! catalog, so they can run in parallel and need no outside infrastructure.

use std::collections::HashSet;
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::web;
use futures::future::join_all;
use reqwest::Client;
use serde_json::{json, Value};
use storefront_service::config::Settings;
use storefront_service::infrastructure::record_store::RecordStore;
use storefront_service::infrastructure::seed::seed_default_catalog;
use storefront_service::{build_server_on, AppState};

/// Wait until `url` answers at all, retrying every `interval` for up to
/// `timeout` total. Panics if the service never comes up.
async fn wait_for_http(label: &str, url: &str, timeout: Duration, interval: Duration) {
    let client = Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .unwrap();
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::time::Instant::now() > deadline {
            panic!("{} did not become ready within {:?}", label, timeout);
        }
        if client.get(url).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Seed `dir`, start the service on 127.0.0.1:0 and return its base url.
async fn start_service(dir: &Path) -> (String, ServerHandle) {
    let data_dir = dir.to_string_lossy().to_string();
    let settings = Settings::from_lookup(|name| match name {
        "DATA_DIR" => Some(data_dir.clone()),
        _ => None,
    })
    .expect("settings");

    let store = Arc::new(RecordStore::new(&settings.data_dir));
    seed_default_catalog(&store, settings.low_stock_threshold)
        .await
        .expect("seed");
    let state = web::Data::new(AppState::new(store, &settings));

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let server = build_server_on(state, listener).expect("Failed to start the service");
    let handle = server.handle();
    tokio::spawn(server);

    let base = format!("http://127.0.0.1:{port}");
    wait_for_http(
        "storefront service",
        &format!("{base}/api/health"),
        Duration::from_secs(10),
        Duration::from_millis(100),
    )
    .await;
    (base, handle)
}

async fn product(http: &Client, base: &str, id: u64) -> Value {
    let products: Value = http
        .get(format!("{base}/api/products"))
        .send()
        .await
        .expect("GET /api/products")
        .json()
        .await
        .expect("products body");
    products
        .as_array()
        .expect("array")
        .iter()
        .find(|p| p["id"] == id)
        .cloned()
        .unwrap_or_else(|| panic!("product {id} missing"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn checkout_then_fulfil_an_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (base, handle) = start_service(dir.path()).await;
    let http = Client::new();

    let resp = http
        .post(format!("{base}/api/orders"))
        .json(&json!({
            "customerName": "Juan dela Cruz",
            "customerPhone": "09171234567",
            "items": [
                {"productId": 1, "quantity": 2},
                {"productId": 3, "quantity": 1}
            ]
        }))
        .send()
        .await
        .expect("POST /api/orders");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("create body");
    let order_id = body["orderId"].as_u64().expect("orderId");
    assert_eq!(order_id, 1001);

    for status in ["processing", "completed"] {
        let resp = http
            .put(format!("{base}/api/orders/{order_id}"))
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("PUT /api/orders/{id}");
        assert_eq!(resp.status(), 200, "transition to {status}");
    }

    let order: Value = http
        .get(format!("{base}/api/orders/{order_id}"))
        .send()
        .await
        .expect("GET /api/orders/{id}")
        .json()
        .await
        .expect("order body");
    assert_eq!(order["status"], "completed");
    assert_eq!(order["total"], 990);

    let report: Value = http
        .get(format!("{base}/api/sales-report"))
        .send()
        .await
        .expect("GET /api/sales-report")
        .json()
        .await
        .expect("report body");
    assert_eq!(report["totalOrders"], 1);
    assert_eq!(report["pendingOrders"], 0);
    assert_eq!(report["totalSales"], 990);

    // The data outlives the process: a fresh store sees the same order.
    let on_disk: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("orders.json")).expect("orders.json"),
    )
    .expect("orders.json is valid JSON");
    assert_eq!(on_disk[0]["id"], 1001);
    assert_eq!(on_disk[0]["status"], "completed");

    handle.stop(true).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stock_updates_leave_one_consistent_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (base, handle) = start_service(dir.path()).await;
    let http = Client::new();

    let updates = [10, 7].map(|stock| {
        let http = http.clone();
        let url = format!("{base}/api/products/5/stock");
        async move {
            http.put(url)
                .json(&json!({ "stock": stock }))
                .send()
                .await
                .expect("PUT stock")
                .status()
        }
    });
    for status in join_all(updates).await {
        assert_eq!(status, 200);
    }

    let liver = product(&http, &base, 5).await;
    let stock = liver["stock"].as_u64().expect("stock");
    assert!(stock == 10 || stock == 7, "unexpected stock {stock}");

    let inventory: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("inventory.json")).expect("inventory.json"),
    )
    .expect("inventory.json is valid JSON");
    let record = inventory
        .as_array()
        .expect("array")
        .iter()
        .find(|r| r["productId"] == 5)
        .cloned()
        .expect("inventory record");
    assert_eq!(record["currentStock"].as_u64(), Some(stock));

    handle.stop(true).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_get_unique_ids_and_reserve_stock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (base, handle) = start_service(dir.path()).await;
    let http = Client::new();

    let checkouts = (0..10).map(|n| {
        let http = http.clone();
        let url = format!("{base}/api/orders");
        async move {
            let resp = http
                .post(url)
                .json(&json!({
                    "customerName": format!("Customer {n}"),
                    "customerPhone": "09171234567",
                    "items": [{"productId": 1, "quantity": 1}]
                }))
                .send()
                .await
                .expect("POST /api/orders");
            assert_eq!(resp.status(), 201);
            let body: Value = resp.json().await.expect("create body");
            body["orderId"].as_u64().expect("orderId")
        }
    });
    let ids: HashSet<u64> = join_all(checkouts).await.into_iter().collect();
    assert_eq!(ids, (1001..=1010).collect::<HashSet<u64>>());

    let liempo = product(&http, &base, 1).await;
    assert_eq!(liempo["stock"], 40);

    let orders: Value = http
        .get(format!("{base}/api/orders"))
        .send()
        .await
        .expect("GET /api/orders")
        .json()
        .await
        .expect("orders body");
    assert_eq!(orders.as_array().map(Vec::len), Some(10));

    handle.stop(true).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overselling_is_rejected_without_touching_stock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (base, handle) = start_service(dir.path()).await;
    let http = Client::new();

    let resp = http
        .post(format!("{base}/api/orders"))
        .json(&json!({
            "customerName": "Juan dela Cruz",
            "customerPhone": "09171234567",
            "items": [
                {"productId": 9, "quantity": 1},
                {"productId": 10, "quantity": 1}
            ]
        }))
        .send()
        .await
        .expect("POST /api/orders");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["success"], false);

    assert_eq!(product(&http, &base, 9).await["stock"], 4);
    assert!(!dir.path().join("orders.json").exists());

    handle.stop(true).await;
}
