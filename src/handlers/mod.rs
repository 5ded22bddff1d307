pub mod common;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::auth::{AuthRouterExt, AuthService};
use crate::AppState;

/// Routes mounted under `/api/admin`, all behind the admin guard.
pub fn admin_routes(auth: Arc<AuthService>) -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics::get_metrics))
        .route("/orders", get(orders::list_orders))
        .route(
            "/orders/:id",
            get(orders::get_order).patch(orders::update_order_status),
        )
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .with_admin(auth)
}
