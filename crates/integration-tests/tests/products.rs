//! End-to-end tests for the catalog.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`ecommerce-cli migrate`)
//! - The API server running (`cargo run -p ecommerce-api`)
//!
//! Run with: cargo test -p ecommerce-integration-tests -- --ignored

use ecommerce_integration_tests::{TestClient, send};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_then_get() {
    let client = TestClient::new();
    let user = client.register_and_login().await;

    let created = client
        .create_product(
            &user,
            json!({"name": "Widget", "description": "A widget", "price": 9.99, "stock": 10}),
        )
        .await;
    let id = created["id"].as_i64().expect("id");

    let (status, body) = send(client.get(&format!("/api/products/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let product = body.data.expect("product");
    assert_eq!(product["name"], "Widget");
    assert_eq!(product["description"], "A widget");
    assert_eq!(product["price"], 9.99);
    assert_eq!(product["stock"], 10);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_and_delete() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let created = client
        .create_product(
            &user,
            json!({"name": "Gadget", "description": "", "price": 3, "stock": 1}),
        )
        .await;
    let id = created["id"].as_i64().expect("id");

    let (status, body) = send(
        client
            .put(&format!("/api/products/update/{id}"))
            .bearer_auth(&user.token)
            .json(&json!({"stock": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = body.data.expect("product");
    assert_eq!(updated["stock"], 7);
    assert_eq!(updated["name"], "Gadget");

    let (status, _) = send(
        client
            .delete(&format!("/api/products/{id}"))
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(client.get(&format!("/api/products/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.message, "Product not found");

    let (status, _) = send(
        client
            .delete(&format!("/api/products/{id}"))
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_filter_by_name_and_price() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let tag = Uuid::new_v4().simple().to_string();

    for (suffix, price) in [("cheap", 2), ("mid", 7), ("dear", 15)] {
        client
            .create_product(
                &user,
                json!({"name": format!("{tag} {suffix}"), "description": "", "price": price, "stock": 1}),
            )
            .await;
    }

    let (status, body) = send(
        client
            .get(&format!(
                "/api/products/filter?name={}&min_price=5&max_price=10",
                tag.to_uppercase()
            ))
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let products = body.data.expect("products");
    let names: Vec<&str> = products
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec![format!("{tag} mid").as_str()]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_filter_rejects_malformed_number() {
    let client = TestClient::new();
    let user = client.register_and_login().await;

    let (status, body) = send(
        client
            .get("/api/products/filter?min_price=abc")
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.unwrap_or_default().contains("min_price"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_filter_name_wildcards_are_literal() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let tag = Uuid::new_v4().simple().to_string();

    client
        .create_product(
            &user,
            json!({"name": format!("{tag} 100% cotton"), "description": "", "price": 1, "stock": 1}),
        )
        .await;
    client
        .create_product(
            &user,
            json!({"name": format!("{tag} 1000 cotton"), "description": "", "price": 1, "stock": 1}),
        )
        .await;

    let (status, body) = send(
        client
            .get("/api/products/filter")
            .query(&[("name", format!("{tag} 100%"))])
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.data.expect("products").as_array().expect("array").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_price_range_bounds_are_inclusive() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let tag = Uuid::new_v4().simple().to_string();

    for (suffix, price) in [("below", 4.99), ("low", 5.0), ("high", 10.0), ("above", 10.01)] {
        client
            .create_product(
                &user,
                json!({"name": format!("{tag} {suffix}"), "description": "", "price": price, "stock": 1}),
            )
            .await;
    }

    let (status, body) = send(
        client
            .get(&format!("/api/products/filter?name={tag}&min_price=5&max_price=10"))
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let products = body.data.expect("products");
    let names: Vec<&str> = products
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![format!("{tag} low").as_str(), format!("{tag} high").as_str()]
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unstorable_prices_are_rejected() {
    let client = TestClient::new();
    let user = client.register_and_login().await;

    for price in [json!(9.999), json!(10_000_000_000_u64)] {
        let (status, body) = send(
            client
                .post("/api/products")
                .bearer_auth(&user.token)
                .json(&json!({"name": "Widget", "description": "", "price": price, "stock": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{price}");
        assert!(!body.success);
    }
}
