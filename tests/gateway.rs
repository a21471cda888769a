//! Gateway forwarding tests: prefix resolution and end-to-end relaying to
//! real upstream services bound on random ports.

use axum::http::Uri;
use microshop::api::gateway::{GatewayState, Upstream, UpstreamTable, router};
use microshop::api::routes::{order_router, product_router};
use microshop::persistence::MemoryStore;
use serde_json::{Value, json};

async fn spawn(app: axum::Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

struct Stack {
    gateway: String,
    products: String,
    _handles: Vec<tokio::task::JoinHandle<()>>,
}

/// Product and order services behind a gateway. `/auth` points at a closed port.
async fn spawn_stack() -> Stack {
    let (product_root, h1) = spawn(product_router(MemoryStore::new())).await;
    let (order_root, h2) = spawn(order_router(MemoryStore::new())).await;
    let products = format!("{}/api/products", product_root);

    let table = UpstreamTable::new(vec![
        Upstream::new("/products", &products),
        Upstream::new("/auth", "http://127.0.0.1:1/api/auth"),
        Upstream::new("/orders", format!("{}/api/orders", order_root)),
    ]);
    let (gateway, h3) = spawn(router(GatewayState::new(table))).await;

    Stack {
        gateway,
        products,
        _handles: vec![h1, h2, h3],
    }
}

fn table() -> UpstreamTable {
    UpstreamTable::new(vec![
        Upstream::new("/products", "http://products:3001/api/products/"),
        Upstream::new("/auth", "http://users:3002/api/auth"),
    ])
}

#[test]
fn resolve_maps_prefix_to_upstream() {
    let t = table();
    let uri: Uri = "/products/123".parse().unwrap();
    assert_eq!(
        t.resolve(&uri).as_deref(),
        Some("http://products:3001/api/products/123")
    );
}

#[test]
fn resolve_exact_prefix_and_query() {
    let t = table();
    let uri: Uri = "/products".parse().unwrap();
    assert_eq!(
        t.resolve(&uri).as_deref(),
        Some("http://products:3001/api/products")
    );
    let uri: Uri = "/auth/login?next=%2Fhome".parse().unwrap();
    assert_eq!(
        t.resolve(&uri).as_deref(),
        Some("http://users:3002/api/auth/login?next=%2Fhome")
    );
}

#[test]
fn resolve_rejects_partial_segment_and_unknown_prefix() {
    let t = table();
    for path in ["/productsx", "/orders/1", "/", "/api/products"] {
        let uri: Uri = path.parse().unwrap();
        assert_eq!(t.resolve(&uri), None, "{path}");
    }
}

#[tokio::test]
async fn get_through_gateway_matches_direct_call() {
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(&stack.products)
        .json(&json!({ "name": "Widget", "description": "Blue", "price": 5, "stock": 3 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let ids = [id.to_string(), "123".to_string()];
    for id in ids {
        let direct = client
            .get(format!("{}/{}", stack.products, id))
            .send()
            .await
            .unwrap();
        let via_gateway = client
            .get(format!("{}/products/{}", stack.gateway, id))
            .send()
            .await
            .unwrap();

        assert_eq!(direct.status(), via_gateway.status());
        assert_eq!(
            direct.headers().get("content-type"),
            via_gateway.headers().get("content-type")
        );
        assert_eq!(direct.bytes().await.unwrap(), via_gateway.bytes().await.unwrap());
    }
}

#[tokio::test]
async fn post_through_gateway_relays_201_and_body() {
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", stack.gateway))
        .json(&json!({
            "userId": "u1",
            "items": [{ "productId": "p1", "name": "Widget", "quantity": 2, "price": 5 }],
            "totalAmount": 10,
            "shippingAddress": "1 Main St"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 201);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["order"]["status"], "Pending");
    assert_eq!(json["order"]["paymentStatus"], "Pending");

    let id = json["order"]["id"].as_str().unwrap();
    let res = client
        .patch(format!("{}/orders/{}/cancel", stack.gateway, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["order"]["status"], "Cancelled");
}

#[tokio::test]
async fn upstream_error_status_is_relayed() {
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", stack.gateway))
        .json(&json!({ "userId": "u1", "items": [], "totalAmount": 10, "shippingAddress": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "Order must contain at least one item");

    let res = client
        .get(format!("{}/orders/user/nobody", stack.gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn unreachable_upstream_returns_500() {
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", stack.gateway))
        .json(&json!({ "email": "a@example.com", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "Upstream request failed");
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn unknown_prefix_returns_404() {
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/payments/1", stack.gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "Route not found");

    let res = client.get(format!("{}/health", stack.gateway)).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "healthy");
}

#[tokio::test]
async fn trailing_slash_through_gateway_reaches_list_route() {
    let stack = spawn_stack().await;
    let client = reqwest::Client::new();

    for path in ["/products", "/products/"] {
        let res = client
            .get(format!("{}{}", stack.gateway, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 200, "{path}");
        let list: Vec<Value> = res.json().await.unwrap();
        assert!(list.is_empty());
    }
}
