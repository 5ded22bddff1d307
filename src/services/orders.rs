use crate::{
    db::DbPool,
    entities::{order, order_item, product, user},
    errors::{messages, ServiceError},
    models::{
        money::{cents_to_decimal, line_subtotal_cents},
        OrderItemView, OrderStatus, OrderView,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Upper bound of ids bound into a single `IN (...)` clause.
const ITEM_LOOKUP_CHUNK: usize = 500;

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Service for reviewing orders and moving them between statuses
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// All orders, newest first, with their line items.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderView>, ServiceError> {
        let db = &*self.db_pool;

        let orders = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .find_also_related(user::Entity)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list orders");
                ServiceError::DatabaseError(e)
            })?;

        let order_ids: Vec<i32> = orders.iter().map(|(o, _)| o.id).collect();
        let mut items = load_items(db, &order_ids).await?;

        let views: Vec<OrderView> = orders
            .into_iter()
            .map(|(order, owner)| {
                let order_items = items.remove(&order.id).unwrap_or_default();
                to_view(order, owner, order_items)
            })
            .collect();

        info!(count = views.len(), "Orders listed");
        Ok(views)
    }

    /// One order with its line items.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<OrderView, ServiceError> {
        let db = &*self.db_pool;

        let (order, owner) = order::Entity::find_by_id(order_id)
            .find_also_related(user::Entity)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::ORDER_NOT_FOUND.to_string()))?;

        let mut items = load_items(db, &[order.id]).await?;
        let order_items = items.remove(&order.id).unwrap_or_default();
        Ok(to_view(order, owner, order_items))
    }

    /// Moves an order to `new_status`.
    ///
    /// The status is checked before the order is looked up, so an invalid
    /// status on an unknown order reports the status problem.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: i32,
        new_status: Option<&str>,
    ) -> Result<order::Model, ServiceError> {
        let status = new_status
            .and_then(|raw| OrderStatus::from_str(raw).ok())
            .ok_or_else(|| {
                warn!(order_id, requested = ?new_status, "Rejected order status");
                ServiceError::InvalidInput(messages::INVALID_STATUS.to_string())
            })?;

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, order_id, "Failed to start transaction for status update");
            ServiceError::DatabaseError(e)
        })?;

        let order = order::Entity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::ORDER_NOT_FOUND.to_string()))?;

        let old_status = order.status.clone();
        let mut active: order::ActiveModel = order.into();
        active.status = Set(status.to_string());

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id, "Failed to update order status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id, "Failed to commit order status update");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id, from = %old_status, to = %updated.status, "Order status updated");
        Ok(updated)
    }
}

/// Line items of the given orders, grouped by order id in insertion order.
async fn load_items<C>(
    db: &C,
    order_ids: &[i32],
) -> Result<HashMap<i32, Vec<OrderItemView>>, ServiceError>
where
    C: ConnectionTrait,
{
    let mut grouped: HashMap<i32, Vec<OrderItemView>> = HashMap::new();

    for chunk in order_ids.chunks(ITEM_LOOKUP_CHUNK) {
        let rows = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(chunk.iter().copied()))
            .order_by_asc(order_item::Column::Id)
            .find_also_related(product::Entity)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load order items");
                ServiceError::DatabaseError(e)
            })?;

        for (item, product) in rows {
            grouped
                .entry(item.order_id)
                .or_default()
                .push(to_item_view(item, product));
        }
    }

    Ok(grouped)
}

fn to_item_view(item: order_item::Model, product: Option<product::Model>) -> OrderItemView {
    OrderItemView {
        product_id: item.product_id,
        product_name: product.map(|p| p.name),
        quantity: item.quantity,
        price_at_purchase: cents_to_decimal(item.price_at_purchase_cents),
        subtotal: cents_to_decimal(line_subtotal_cents(
            item.price_at_purchase_cents,
            item.quantity,
        )),
    }
}

fn to_view(order: order::Model, owner: Option<user::Model>, items: Vec<OrderItemView>) -> OrderView {
    OrderView {
        id: order.id,
        user_id: order.user_id,
        user_email: owner.map(|u| u.email),
        status: order.status,
        total_amount: cents_to_decimal(order.total_amount_cents),
        created_at: order.created_at.format(CREATED_AT_FORMAT).to_string(),
        items,
    }
}
