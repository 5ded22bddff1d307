//! Request and response types shared by the admin handlers and services.

pub mod coerce;
pub mod money;
pub mod order;
pub mod order_status;
pub mod product;

pub use coerce::{CoercedDecimal, CoercedInt, ImageUrls};
pub use order::{OrderItemView, OrderStatusUpdate, OrderView, StatusUpdated};
pub use order_status::OrderStatus;
pub use product::{NewProduct, ProductCreated, ProductPatch};
