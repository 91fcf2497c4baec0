#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chrono::Duration;
use lazy_static::lazy_static;
use serde_json::{json, Value};

use roleauth::auth::{BcryptHasher, JwtSigner};
use roleauth::bootstrap::ensure_admin_user;
use roleauth::configuration::{AdminSettings, JwtSettings};
use roleauth::startup::{run, AppContext};
use roleauth::store::{InMemoryRefreshTokenStore, InMemoryUserStore};
use roleauth::telemetry::{get_subscriber, init_subscriber};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";

// Set TEST_LOG to see the logs of a failing test.
lazy_static! {
    static ref TRACING: () = {
        if std::env::var("TEST_LOG").is_ok() {
            let _ = init_subscriber(get_subscriber("debug", std::io::stdout));
        } else {
            let _ = init_subscriber(get_subscriber("debug", std::io::sink));
        }
    };
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        issuer: "roleauth-test".to_string(),
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub users: Arc<InMemoryUserStore>,
    pub tokens: Arc<InMemoryRefreshTokenStore>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_refresh_ttl(Duration::days(7)).await
}

pub async fn spawn_app_with_refresh_ttl(refresh_ttl: Duration) -> TestApp {
    lazy_static::initialize(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let users = Arc::new(InMemoryUserStore::new());
    let tokens = Arc::new(InMemoryRefreshTokenStore::new());
    let hasher = Arc::new(BcryptHasher::new(BcryptHasher::MIN_COST).expect("Failed to build hasher"));
    let signer = Arc::new(JwtSigner::new(&jwt_settings()));

    ensure_admin_user(
        users.as_ref(),
        hasher.as_ref(),
        &AdminSettings {
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    )
    .await
    .expect("Failed to seed admin user");

    let context = AppContext::new(users.clone(), tokens.clone(), hasher, signer, refresh_ttl);
    let server = run(listener, context).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
        users,
        tokens,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/api/v1/auth/register",
            &json!({
                "username": username,
                "firstName": "Test",
                "lastName": "User",
                "password": password
            }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/api/v1/auth/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post_json(
            "/api/v1/auth/refresh-token",
            &json!({ "refreshToken": refresh_token }),
        )
        .await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_json_with_token(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_text_with_token(&self, path: &str, token: &str, body: &str) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register `username` and return the parsed AuthResult body.
    pub async fn register_ok(&self, username: &str, password: &str) -> Value {
        let response = self.register(username, password).await;
        assert_eq!(201, response.status().as_u16(), "registration of {} failed", username);
        response.json().await.expect("Failed to parse response")
    }

    pub async fn admin_access_token(&self) -> String {
        let response = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        body["accessToken"].as_str().unwrap().to_string()
    }
}

pub fn token(body: &Value, field: &str) -> String {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("{} missing from {}", field, body))
        .to_string()
}
