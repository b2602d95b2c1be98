use crate::config::AppConfig;
use crate::storage::MemoryRecordStore;
use crate::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use shared::LoginResponse;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryRecordStore>,
}

impl TestApp {
    /// Router over an in-memory store with the default admin seeded
    pub async fn new() -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let config = AppConfig {
            lottery_seed: Some(11),
            ..AppConfig::default()
        };
        let state = AppState::new(store.clone(), config.clone());
        state
            .user_service
            .ensure_seed_admin(&config.seed_admin)
            .await
            .unwrap();
        Self {
            router: create_router(state.clone()),
            state,
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.request(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        login.token
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", "admin123").await
    }

    /// Registers a resident account and logs it in
    pub async fn resident_token(&self) -> String {
        let admin = self.admin_token().await;
        let (status, _) = self
            .json(
                Method::POST,
                "/api/users",
                Some(&admin),
                Some(serde_json::json!({
                    "username": "warga01",
                    "password": "warga01",
                    "display_name": "Pak Slamet",
                    "role": "resident"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login("warga01", "warga01").await
    }
}
