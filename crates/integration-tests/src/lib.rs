//! Integration tests for the e-commerce API.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -p ecommerce-cli -- migrate
//! cargo run -p ecommerce-api
//!
//! # Run the ignored end-to-end tests against it
//! cargo test -p ecommerce-integration-tests -- --ignored
//! ```
//!
//! `API_BASE_URL` overrides the default `http://localhost:8080`. Each test
//! registers its own user with a random email, so runs do not collide.
//!
//! The login and register endpoints are rate limited per client IP. Every
//! request carries a random `X-Forwarded-For`, which the server only honours
//! when started with `TRUST_PROXY_HEADERS=true`. Without it the credential
//! calls go through [`send_credentials`], which waits out each 429, so the
//! suite still passes, only slower.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// The response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub message: String,
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A registered user and a bearer token for them.
#[derive(Debug)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// HTTP client bound to the API under test.
#[derive(Debug, Clone)]
pub struct TestClient {
    client: Client,
    base_url: String,
    forwarded_for: String,
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClient {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let octets = Uuid::new_v4().into_bytes();
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url(),
            forwarded_for: format!("10.{}.{}.{}", octets[0], octets[1], octets[2]),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("x-forwarded-for", &self.forwarded_for)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::GET, path)
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::POST, path)
    }

    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::PUT, path)
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::DELETE, path)
    }

    /// Register a fresh user and log them in.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn register_and_login(&self) -> TestUser {
        let suffix = Uuid::new_v4().simple().to_string();
        let username = format!("user_{}", &suffix[..12]);
        let email = format!("{username}@example.com");
        let password = "correct horse".to_string();

        let (status, body) = send_credentials(self.post("/api/users/register").json(&json!({
            "username": username,
            "email": email,
            "password": password,
        })))
        .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body:?}");
        let id = body.data.as_ref().and_then(|d| d["id"].as_i64()).expect("user id");

        let (status, body) = send_credentials(
            self.post("/api/users/login")
                .json(&json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body:?}");
        let token = body
            .data
            .as_ref()
            .and_then(|d| d["token"].as_str())
            .expect("token")
            .to_string();

        TestUser {
            id,
            username,
            email,
            password,
            token,
        }
    }

    /// Create a product as `user` and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    pub async fn create_product(&self, user: &TestUser, product: Value) -> Value {
        let (status, body) = send(
            self.post("/api/products")
                .bearer_auth(&user.token)
                .json(&product),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "create product failed: {body:?}");
        body.data.expect("product data")
    }
}

/// Send a request and decode the envelope.
///
/// # Panics
///
/// Panics if the request fails or the body is not an envelope.
pub async fn send(request: RequestBuilder) -> (StatusCode, Envelope) {
    let response: Response = request.send().await.expect("request failed");
    let status = response.status();
    let body = response.json::<Envelope>().await.expect("envelope body");
    (status, body)
}

/// Send a login or register request, sleeping through rate limit responses.
///
/// # Panics
///
/// Panics if the request body cannot be cloned, the request fails, or the
/// body is not an envelope.
pub async fn send_credentials(request: RequestBuilder) -> (StatusCode, Envelope) {
    loop {
        let attempt = request.try_clone().expect("credential request is cloneable");
        let response = attempt.send().await.expect("request failed");
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            let status = response.status();
            let body = response.json::<Envelope>().await.expect("envelope body");
            return (status, body);
        }

        let wait = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(6);
        tokio::time::sleep(Duration::from_secs(wait)).await;
    }
}
