//! Shared harness: in-memory database, seeded catalog, oneshot requests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use pos_server::auth::JwtConfig;
use pos_server::auth::permissions::{REPORTS_GENERATE, REPORTS_VIEW, SHIFTS_MANAGE};
use pos_server::db::DbService;
use pos_server::db::repository::catalog;
use pos_server::{Config, ServerState, build_app};
use serde_json::Value;
use shared::models::{CatalogItem, ItemCategory};
use tower::ServiceExt;

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
}

const MENU: &[(&str, ItemCategory, f64)] = &[
    ("menu-10", ItemCategory::Main, 10.0),
    ("menu-15", ItemCategory::Main, 15.0),
    ("menu-20", ItemCategory::Main, 20.0),
    ("cola", ItemCategory::Drink, 2.5),
    ("fries", ItemCategory::Side, 3.0),
];

pub async fn setup() -> TestApp {
    let jwt = JwtConfig {
        secret: "integration-test-secret-0123456789abcdef".into(),
        expiration_minutes: 60,
        issuer: "pos-auth".into(),
        audience: "pos-server".into(),
    };
    let mut config = Config::new("./target/test-work-dir", jwt);
    config.timezone = chrono_tz::UTC;
    config.day_close_retry_attempts = 1;
    config.day_close_retry_base_delay_ms = 1;

    let db = DbService::in_memory().await.unwrap();
    for (item_ref, category, price) in MENU {
        catalog::upsert(
            &db.pool,
            &CatalogItem {
                item_ref: item_ref.to_string(),
                name: item_ref.to_uppercase(),
                category: *category,
                price: *price,
            },
        )
        .await
        .unwrap();
    }

    let state = ServerState::with_pool(config, db.pool);
    let app = build_app(&state).with_state(state.clone());
    TestApp { state, app }
}

impl TestApp {
    pub fn token(&self, employee_id: &str, role: &str, permissions: &[&str]) -> String {
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        self.state
            .jwt_service
            .generate_token(employee_id, employee_id, role, &permissions)
            .unwrap()
    }

    pub fn manager(&self) -> String {
        self.token(
            "mgr-1",
            "manager",
            &[REPORTS_GENERATE, REPORTS_VIEW, SHIFTS_MANAGE],
        )
    }

    pub fn waiter(&self, employee_id: &str) -> String {
        self.token(employee_id, "waiter", &[])
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Create an order with one main and check it out
    pub async fn checkout(&self, token: &str, item_ref: &str, method: &str, paid: bool) -> Value {
        let items = serde_json::json!({ "mains": [{ "item_ref": item_ref, "quantity": 1 }] });
        self.checkout_items(token, items, method, paid).await
    }

    pub async fn create_order(&self, token: &str, items: Value) -> Value {
        let (status, order) = self
            .send(
                "POST",
                "/api/orders",
                Some(token),
                Some(serde_json::json!({ "table_number": 1, "items": items })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{order}");
        order
    }

    pub async fn checkout_items(&self, token: &str, items: Value, method: &str, paid: bool) -> Value {
        let order = self.create_order(token, items).await;

        let (status, receipt) = self
            .send(
                "POST",
                "/api/receipts",
                Some(token),
                Some(serde_json::json!({
                    "order_id": order["id"],
                    "payment_method": method,
                    "is_paid": paid
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{receipt}");
        receipt
    }
}
