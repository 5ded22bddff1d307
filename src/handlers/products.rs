use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::info;

use super::common::{IdPath, JsonBody, MessageResponse};
use crate::{
    auth::AdminUser,
    errors::{messages, ServiceError},
    models::{NewProduct, ProductCreated, ProductPatch},
    AppState,
};

/// `POST /api/admin/products`
pub async fn create_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    JsonBody(request): JsonBody<NewProduct>,
) -> Result<(StatusCode, Json<ProductCreated>), ServiceError> {
    let id = state.services.products.create_product(request).await?;
    info!(admin_id = admin.user_id, product_id = id, "product created by admin");

    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            message: messages::CREATED.to_string(),
            id,
        }),
    ))
}

/// `PUT /api/admin/products/:id`
pub async fn update_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    IdPath(product_id): IdPath,
    JsonBody(patch): JsonBody<ProductPatch>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state
        .services
        .products
        .update_product(product_id, patch)
        .await?;
    info!(admin_id = admin.user_id, product_id, "product updated by admin");

    Ok(Json(MessageResponse::new(messages::UPDATED)))
}

/// `DELETE /api/admin/products/:id`
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    IdPath(product_id): IdPath,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.services.products.delete_product(product_id).await?;
    info!(admin_id = admin.user_id, product_id, "product deleted by admin");

    Ok(Json(MessageResponse::new(messages::DELETED)))
}
