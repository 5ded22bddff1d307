use crate::{
    db::DbPool,
    entities::product,
    errors::{messages, ServiceError},
    models::{money::decimal_to_cents, CoercedDecimal, CoercedInt, NewProduct, ProductPatch},
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Product maintenance for the admin panel.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Inserts a product and returns its id. Price and stock default to 0.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(&self, request: NewProduct) -> Result<i32, ServiceError> {
        let price_cents = request
            .price
            .map(|CoercedDecimal(price)| decimal_to_cents(price))
            .transpose()?
            .unwrap_or(0);

        let active = product::ActiveModel {
            name: Set(request.name),
            description: Set(request.description),
            price_cents: Set(price_cents),
            stock: Set(request.stock.map(|CoercedInt(stock)| stock).unwrap_or(0)),
            category: Set(request.category),
            image_urls: Set(request.image_urls.map(|urls| urls.to_column())),
            ..Default::default()
        };

        let txn = self.db_pool.begin().await?;
        let created = active.insert(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to insert product");
            ServiceError::DatabaseError(e)
        })?;
        txn.commit().await?;

        info!(product_id = created.id, "Product created");
        Ok(created.id)
    }

    /// Applies the fields present in `patch`. Nothing is written when the
    /// patch carries no recognized field.
    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        product_id: i32,
        patch: ProductPatch,
    ) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let existing = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::PRODUCT_NOT_FOUND.to_string()))?;

        let mut active: product::ActiveModel = existing.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(CoercedDecimal(price)) = patch.price {
            active.price_cents = Set(decimal_to_cents(price)?);
        }
        if let Some(CoercedInt(stock)) = patch.stock {
            active.stock = Set(stock);
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(image_urls) = patch.image_urls {
            active.image_urls = Set(image_urls.map(|urls| urls.to_column()));
        }

        if !active.is_changed() {
            info!(product_id, "Product update carried no changes");
            return Ok(());
        }

        active.update(&txn).await.map_err(|e| {
            error!(error = %e, product_id, "Failed to update product");
            ServiceError::DatabaseError(e)
        })?;
        txn.commit().await?;

        info!(product_id, "Product updated");
        Ok(())
    }

    /// Hard-deletes a product. Historical order lines keep its id.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let result = product::Entity::delete_by_id(product_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, product_id, "Failed to delete product");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                messages::PRODUCT_NOT_FOUND.to_string(),
            ));
        }

        txn.commit().await?;
        info!(product_id, "Product deleted");
        Ok(())
    }
}
