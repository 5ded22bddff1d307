use axum::{extract::State, Extension, Json};
use tracing::info;

use super::common::{IdPath, JsonBody};
use crate::{
    auth::AdminUser,
    errors::{messages, ServiceError},
    models::{OrderStatusUpdate, OrderView, StatusUpdated},
    AppState,
};

/// `GET /api/admin/orders`
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderView>>, ServiceError> {
    let orders = state.services.orders.list_orders().await?;
    Ok(Json(orders))
}

/// `GET /api/admin/orders/:id`
pub async fn get_order(
    State(state): State<AppState>,
    IdPath(order_id): IdPath,
) -> Result<Json<OrderView>, ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    Ok(Json(order))
}

/// `PATCH /api/admin/orders/:id`
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    IdPath(order_id): IdPath,
    JsonBody(request): JsonBody<OrderStatusUpdate>,
) -> Result<Json<StatusUpdated>, ServiceError> {
    let updated = state
        .services
        .orders
        .update_status(order_id, request.status_str())
        .await?;

    info!(admin_id = admin.user_id, order_id, status = %updated.status, "order status changed by admin");

    Ok(Json(StatusUpdated {
        message: messages::UPDATED.to_string(),
        order_id: updated.id,
        status: updated.status,
    }))
}
