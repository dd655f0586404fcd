#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use cpatrack::api::AppState;
use cpatrack::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like [`spawn_app`], with a hook to adjust the config before startup.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("cpatrack_test_{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}?mode=rwc", db_path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    configure(&mut config);

    let state = cpatrack::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = cpatrack::api::router(state.clone());

    TestApp { router, state }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    /// Raw GET returning status, content type and body bytes.
    pub async fn get_raw(&self, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, String, Vec<u8>) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, bytes.to_vec())
    }

    /// Registers an account and returns its id.
    pub async fn register(&self, email: &str, role: &str) -> i32 {
        let (status, body) = self
            .post(
                "/api/auth",
                json!({"action": "register", "email": email, "password": "pa55word", "role": role}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        i32::try_from(body["user"]["id"].as_i64().unwrap()).unwrap()
    }

    /// Creates an offer and returns its id.
    pub async fn create_offer(&self, advertiser_id: i32, payout: f64) -> i32 {
        let (status, body) = self
            .post(
                "/api/offers",
                json!({
                    "name": "Credit cards",
                    "description": "Lead form",
                    "payout": payout,
                    "category": "finance",
                    "advertiser_id": advertiser_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create offer failed: {body}");
        i32::try_from(body["offer_id"].as_i64().unwrap()).unwrap()
    }

    /// Creates an offer and walks it through test lead, prepayment and activation.
    pub async fn create_active_offer(&self, advertiser_id: i32, payout: f64) -> i32 {
        let offer_id = self.create_offer(advertiser_id, payout).await;
        for action in ["test_lead", "prepayment", "activate"] {
            let (status, body) = self
                .put("/api/offers", json!({"offer_id": offer_id, "action": action}))
                .await;
            assert_eq!(status, StatusCode::OK, "{action} failed: {body}");
        }
        offer_id
    }

    pub async fn click(&self, offer_id: i32, wm_id: i32) -> StatusCode {
        self.get_raw(
            &format!("/api/pixel?action=click&offer_id={offer_id}&wm_id={wm_id}"),
            &[],
        )
        .await
        .0
    }

    pub async fn convert(&self, offer_id: i32, wm_id: i32) -> StatusCode {
        self.get_raw(
            &format!("/api/pixel?action=convert&offer_id={offer_id}&wm_id={wm_id}"),
            &[],
        )
        .await
        .0
    }

    pub async fn balance_minor(&self, user_id: i32) -> i64 {
        self.state
            .store()
            .get_user(user_id)
            .await
            .unwrap()
            .unwrap()
            .balance
            .minor()
    }
}
