//! Shared setup for the router tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use amity_core::{IdentityStore, NodeConfig, StorageBackend, Store, UserId};
use amity_node::{server, AppState};
use amity_state::{MemoryStore, SqliteStore};

pub const PASSWORD: &str = "tricky-bramble-42";

pub fn test_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.auth.secret = "integration-secret".to_string();
    config.auth.hash_iterations = 1;
    config.storage.backend = StorageBackend::Memory;
    config.server.name = "test-node".to_string();
    config
}

pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(test_config(), Arc::new(MemoryStore::new()))
    }

    pub async fn sqlite() -> Self {
        let mut config = test_config();
        config.storage.backend = StorageBackend::Sqlite;
        let store = SqliteStore::in_memory().await.unwrap();
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: NodeConfig, store: Arc<dyn Store>) -> Self {
        let state = Arc::new(AppState::new(config, store).unwrap());
        let router = server::create_router(Arc::clone(&state));
        Self { state, router }
    }

    /// Send a request and decode the body as JSON (or a JSON string for text)
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.raw(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// Send a prepared request and return the raw response
    pub async fn raw(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, body).await
    }

    pub async fn signup(&self, email: &str) -> (StatusCode, Value) {
        self.post(
            "/signup/",
            None,
            Some(json!({
                "email": email,
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/login/",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register and log in, returning the id and an access token
    pub async fn member(&self, email: &str) -> (UserId, String) {
        let (status, body) = self.signup(email).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let access = body["access"].as_str().unwrap().to_string();

        let user = self
            .state
            .store
            .find_by_username(&email.to_lowercase())
            .await
            .unwrap()
            .unwrap();
        (user.id, access)
    }
}

/// Ids in a JSON array of objects
pub fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}
