//! Business logic behind the admin endpoints. Handlers stay thin and
//! delegate here; every service owns a handle to the shared pool.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;

pub mod metrics;
pub mod orders;
pub mod products;

pub use metrics::MetricsService;
pub use orders::OrderService;
pub use products::ProductService;

/// Services shared by all request handlers.
#[derive(Clone)]
pub struct AppServices {
    pub metrics: Arc<MetricsService>,
    pub orders: Arc<OrderService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            metrics: Arc::new(MetricsService::new(
                db_pool.clone(),
                config.top_products_limit,
                config.uncategorized_label.clone(),
            )),
            orders: Arc::new(OrderService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool)),
        }
    }
}
