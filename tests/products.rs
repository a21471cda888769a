//! Integration tests for the product service CRUD surface.

use chrono::{DateTime, Utc};
use microshop::api::routes::product_router;
use microshop::persistence::MemoryStore;
use serde_json::{Value, json};

async fn spawn_app() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/api/products", addr);
    let app = product_router(MemoryStore::new());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, handle)
}

fn widget() -> Value {
    json!({ "name": "Widget", "description": "A small widget", "price": 9.99, "stock": 12 })
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

async fn create(client: &reqwest::Client, base_url: &str, body: &Value) -> Value {
    let res = client.post(base_url).json(body).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 201);
    res.json().await.unwrap()
}

#[tokio::test]
async fn create_product_returns_201_with_product() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    let product = create(&client, &base_url, &widget()).await;
    assert_eq!(product["name"], "Widget");
    assert_eq!(product["description"], "A small widget");
    assert_eq!(product["price"], 9.99);
    assert_eq!(product["stock"], 12);
    assert!(product["id"].as_str().is_some());
}

#[tokio::test]
async fn create_product_with_zero_stock_is_accepted() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    let mut body = widget();
    body["stock"] = json!(0);
    let product = create(&client, &base_url, &body).await;
    assert_eq!(product["stock"], 0);
}

#[tokio::test]
async fn create_product_missing_field_returns_400() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    for field in ["name", "description", "price", "stock"] {
        let mut body = widget();
        body.as_object_mut().unwrap().remove(field);
        let res = client.post(&base_url).json(&body).send().await.unwrap();
        assert_eq!(res.status().as_u16(), 400, "missing {field}");
        let json: Value = res.json().await.unwrap();
        assert_eq!(json["message"], "All fields are required");
    }
}

#[tokio::test]
async fn create_product_negative_stock_returns_400() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    let mut body = widget();
    body["stock"] = json!(-1);
    let res = client.post(&base_url).json(&body).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn list_and_get_products() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    let first = create(&client, &base_url, &widget()).await;
    let mut gadget = widget();
    gadget["name"] = json!("Gadget");
    create(&client, &base_url, &gadget).await;

    let list: Vec<Value> = client.get(&base_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["name"], "Widget");
    assert_eq!(list[1]["name"], "Gadget");

    let res = client
        .get(format!("{}/{}", base_url, first["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched, first);
}

#[tokio::test]
async fn get_unknown_product_returns_404() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/{}", base_url, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "Product not found");
}

#[tokio::test]
async fn update_product_replaces_fields() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let product = create(&client, &base_url, &widget()).await;
    let id = product["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/{}", base_url, id))
        .json(&json!({ "name": "Widget v2", "description": "Bigger", "price": 12.5, "stock": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["name"], "Widget v2");
    assert_eq!(updated["description"], "Bigger");
    assert_eq!(updated["price"], 12.5);
    assert_eq!(updated["stock"], 0);
    assert_eq!(updated["createdAt"], product["createdAt"]);
    assert!(timestamp(&updated["updatedAt"]) > timestamp(&product["updatedAt"]));
}

#[tokio::test]
async fn update_product_partial_body_keeps_other_fields() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let product = create(&client, &base_url, &widget()).await;
    let url = format!("{}/{}", base_url, product["id"].as_str().unwrap());

    let res = client.put(&url).json(&json!({ "price": 3 })).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["price"], 3.0);
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["description"], "A small widget");
    assert_eq!(updated["stock"], 12);
    assert_eq!(updated["createdAt"], product["createdAt"]);

    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_product_negative_stock_returns_400_and_keeps_product() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let product = create(&client, &base_url, &widget()).await;
    let url = format!("{}/{}", base_url, product["id"].as_str().unwrap());

    let res = client.put(&url).json(&json!({ "stock": -1 })).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "Price and stock must not be negative");

    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, product);
}

#[tokio::test]
async fn trailing_slash_reaches_list_route() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    create(&client, &base_url, &widget()).await;

    let res = client.get(format!("{}/", base_url)).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let list: Vec<Value> = res.json().await.unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn update_unknown_product_returns_404() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/{}", base_url, uuid::Uuid::new_v4()))
        .json(&widget())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_product_then_get_returns_404() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let product = create(&client, &base_url, &widget()).await;
    let url = format!("{}/{}", base_url, product["id"].as_str().unwrap());

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "Product deleted successfully");

    assert_eq!(client.get(&url).send().await.unwrap().status().as_u16(), 404);
    assert_eq!(client.delete(&url).send().await.unwrap().status().as_u16(), 404);
}
