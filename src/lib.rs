//! Shop Admin API
//!
//! Administrative HTTP API of the shop backend: sales metrics, order review
//! and status changes, and product maintenance. Every `/api/admin` route
//! requires an administrator's bearer token.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod reports;
pub mod services;
pub mod telemetry;

use axum::{http::HeaderValue, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::auth::{AuthConfig, AuthService};
use crate::services::AppServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

impl AppState {
    /// Wires the auth service and business services around one pool.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(
            AuthConfig::new(config.jwt_secret.clone()).with_leeway(config.jwt_leeway_secs),
            db.clone(),
        ));
        let services = AppServices::new(db.clone(), &config);

        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Builds the complete HTTP application.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/admin", handlers::admin_routes(state.auth.clone()))
        .layer(telemetry::configure_http_tracing())
        .layer(cors)
        // Outermost so the trace span and error logs see the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

/// CORS restricted to the configured origins, permissive when none are set.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if cfg.is_production() {
            warn!("No CORS origins configured; allowing any origin");
        } else {
            info!("Using permissive CORS because explicit origins were not configured");
        }
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
