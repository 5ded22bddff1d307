#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use shop_admin_api::{
    app_router,
    config::AppConfig,
    db,
    entities::{order, order_item, product, user},
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789-abcdef";

/// Helper harness for spinning up the application against a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: user::Model,
    token: String,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state and one administrator.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] with a hook to adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let db_dir = TempDir::new().expect("create temp dir for test database");
        let db_path = db_dir.path().join("shop_admin_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = app_router(state.clone());

        let mut app = Self {
            router,
            state,
            admin: user::Model {
                id: 0,
                email: String::new(),
                is_admin: true,
                created_at: Utc::now(),
            },
            token: String::new(),
            _db_dir: db_dir,
        };

        app.admin = app.seed_user("admin@shop.test", true).await;
        app.token = app.token_for(app.admin.id);
        app
    }

    /// Bearer token of the default administrator.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Signs a one-hour token whose subject is `user_id`.
    pub fn token_for(&self, user_id: i32) -> String {
        self.sign(json!({
            "sub": user_id.to_string(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
            "iat": Utc::now().timestamp(),
        }))
    }

    /// Signs arbitrary claims with the application's secret.
    pub fn sign(&self, claims: Value) -> String {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("encode test token")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    /// Dispatches a fully built request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a raw body with a JSON content type as the default administrator.
    pub async fn request_raw(&self, method: Method, uri: &str, raw_body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token()))
            .header("content-type", "application/json")
            .body(Body::from(raw_body.to_string()))
            .expect("failed to build request");
        self.send(request).await
    }

    /// Convenience helper for requests made by the default administrator.
    pub async fn request_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    pub async fn seed_user(&self, email: &str, is_admin: bool) -> user::Model {
        user::ActiveModel {
            email: Set(email.to_string()),
            is_admin: Set(is_admin),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed user")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        category: Option<&str>,
        price_cents: i64,
    ) -> product::Model {
        product::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            price_cents: Set(price_cents),
            stock: Set(10),
            category: Set(category.map(str::to_string)),
            image_urls: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }

    /// Inserts an order with `(product_id, quantity, price_cents)` lines.
    pub async fn seed_order(
        &self,
        user_id: Option<i32>,
        status: &str,
        total_cents: i64,
        created_at: DateTime<Utc>,
        lines: &[(i32, i32, i64)],
    ) -> order::Model {
        let created = order::ActiveModel {
            user_id: Set(user_id),
            status: Set(status.to_string()),
            total_amount_cents: Set(total_cents),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed order");

        for &(product_id, quantity, price_cents) in lines {
            order_item::ActiveModel {
                order_id: Set(created.id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                price_at_purchase_cents: Set(price_cents),
                ..Default::default()
            }
            .insert(&*self.state.db)
            .await
            .expect("seed order item");
        }

        created
    }
}

/// Reads a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}
