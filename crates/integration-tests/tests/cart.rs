//! End-to-end tests for the cart.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`ecommerce-cli migrate`)
//! - The API server running (`cargo run -p ecommerce-api`)
//!
//! Run with: cargo test -p ecommerce-integration-tests -- --ignored

use ecommerce_integration_tests::{TestClient, TestUser, send};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn product_id(client: &TestClient, user: &TestUser) -> i64 {
    let product = client
        .create_product(
            user,
            json!({"name": "Cart widget", "description": "", "price": 4.5, "stock": 100}),
        )
        .await;
    product["id"].as_i64().expect("id")
}

async fn cart(client: &TestClient, user: &TestUser) -> Vec<Value> {
    let (status, body) = send(client.get("/api/cart").bearer_auth(&user.token)).await;
    assert_eq!(status, StatusCode::OK);
    body.data
        .and_then(|d| d.as_array().cloned())
        .expect("cart items")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_adding_twice_merges_quantities() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let product_id = product_id(&client, &user).await;

    for quantity in [2, 3] {
        let (status, _) = send(
            client
                .post("/api/cart")
                .bearer_auth(&user.token)
                .json(&json!({"product_id": product_id, "quantity": quantity})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let items = cart(&client, &user).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);
    assert_eq!(items[0]["user_id"], user.id);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_and_remove() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let product_id = product_id(&client, &user).await;

    send(
        client
            .post("/api/cart")
            .bearer_auth(&user.token)
            .json(&json!({"product_id": product_id, "quantity": 1})),
    )
    .await;

    let (status, body) = send(
        client
            .put(&format!("/api/cart/{product_id}"))
            .bearer_auth(&user.token)
            .json(&json!({"quantity": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.data.expect("item")["quantity"], 9);

    let (status, _) = send(
        client
            .delete(&format!("/api/cart/{product_id}"))
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart(&client, &user).await.is_empty());

    let (status, body) = send(
        client
            .delete(&format!("/api/cart/{product_id}"))
            .bearer_auth(&user.token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.message, "Item not found in cart");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_product_is_not_found() {
    let client = TestClient::new();
    let user = client.register_and_login().await;

    let (status, body) = send(
        client
            .post("/api/cart")
            .bearer_auth(&user.token)
            .json(&json!({"product_id": i32::MAX, "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.message, "Product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_carts_are_per_user() {
    let client = TestClient::new();
    let alice = client.register_and_login().await;
    let product_id = product_id(&client, &alice).await;

    send(
        client
            .post("/api/cart")
            .bearer_auth(&alice.token)
            .json(&json!({"product_id": product_id, "quantity": 1})),
    )
    .await;

    let other = TestClient::new();
    let bob = other.register_and_login().await;
    assert!(cart(&other, &bob).await.is_empty());

    let (status, _) = send(
        other
            .delete(&format!("/api/cart/{product_id}"))
            .bearer_auth(&bob.token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(cart(&client, &alice).await.len(), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_merge_past_integer_range_is_rejected() {
    let client = TestClient::new();
    let user = client.register_and_login().await;
    let product_id = product_id(&client, &user).await;

    let (status, _) = send(
        client
            .post("/api/cart")
            .bearer_auth(&user.token)
            .json(&json!({"product_id": product_id, "quantity": i32::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        client
            .post("/api/cart")
            .bearer_auth(&user.token)
            .json(&json!({"product_id": product_id, "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.message, "Invalid input");

    let items = cart(&client, &user).await;
    assert_eq!(items[0]["quantity"], i32::MAX);
}
