use crate::{
    db::DbPool,
    entities::{order, order_item, product, user},
    errors::ServiceError,
    models::{money::cents_to_decimal, OrderStatus},
    reports::{
        category_sales, top_products, AdminMetrics, CategoryRevenueRow, CategorySales,
        HeadlineMetrics, ProductSalesRow, TopProduct,
    },
};
use sea_orm::{
    sea_query::{Alias, Expr, Func, SimpleExpr},
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Read-only sales reporting over orders, order lines and products.
#[derive(Clone)]
pub struct MetricsService {
    db_pool: Arc<DbPool>,
    top_products_limit: u64,
    uncategorized_label: String,
}

impl MetricsService {
    pub fn new(db_pool: Arc<DbPool>, top_products_limit: u64, uncategorized_label: String) -> Self {
        Self {
            db_pool,
            top_products_limit,
            uncategorized_label,
        }
    }

    /// User and order counters plus recognized revenue.
    #[instrument(skip(self))]
    pub async fn headline(&self) -> Result<HeadlineMetrics, ServiceError> {
        let db = &*self.db_pool;

        let total_users = user::Entity::find().count(db).await?;
        let total_orders = order::Entity::find().count(db).await?;
        let pending_orders = order::Entity::find()
            .filter(order::Column::Status.eq(OrderStatus::Pending.as_str()))
            .count(db)
            .await?;
        let paid_orders = order::Entity::find()
            .filter(order::Column::Status.eq(OrderStatus::Paid.as_str()))
            .count(db)
            .await?;

        let revenue_cents: i64 = order::Entity::find()
            .select_only()
            .column_as(
                sum_as_bigint(Expr::col((order::Entity, order::Column::TotalAmountCents))),
                "revenue_cents",
            )
            .filter(order::Column::Status.is_in(OrderStatus::recognized_values()))
            .into_tuple::<i64>()
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to sum recognized order totals");
                ServiceError::DatabaseError(e)
            })?
            .unwrap_or(0);

        Ok(HeadlineMetrics {
            total_users,
            total_orders,
            pending_orders,
            paid_orders,
            revenue: cents_to_decimal(revenue_cents),
        })
    }

    /// Revenue of recognized orders grouped by product category.
    #[instrument(skip(self))]
    pub async fn category_sales(&self) -> Result<Vec<CategorySales>, ServiceError> {
        let rows: Vec<(Option<String>, i64)> = recognized_lines()
            .select_only()
            .column(product::Column::Category)
            .column_as(sum_as_bigint(line_revenue()), "revenue_cents")
            .group_by(product::Column::Category)
            .into_tuple()
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to aggregate category sales");
                ServiceError::DatabaseError(e)
            })?;

        let rows = rows
            .into_iter()
            .map(|(category, revenue_cents)| CategoryRevenueRow {
                category,
                revenue_cents,
            })
            .collect();
        Ok(category_sales(rows, &self.uncategorized_label))
    }

    /// Best selling products by units, at most `limit` rows. Equal unit
    /// counts are ranked by product id.
    #[instrument(skip(self))]
    pub async fn top_products(&self, limit: u64) -> Result<Vec<TopProduct>, ServiceError> {
        let units = || sum_as_bigint(Expr::col((order_item::Entity, order_item::Column::Quantity)));

        let rows: Vec<(i32, String, i64, i64)> = recognized_lines()
            .select_only()
            .column(order_item::Column::ProductId)
            .column(product::Column::Name)
            .column_as(units(), "quantity_sold")
            .column_as(sum_as_bigint(line_revenue()), "revenue_cents")
            .group_by(order_item::Column::ProductId)
            .group_by(product::Column::Name)
            .order_by_desc(units())
            .order_by_asc(order_item::Column::ProductId)
            .limit(limit)
            .into_tuple()
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, limit, "Failed to rank top products");
                ServiceError::DatabaseError(e)
            })?;

        let rows = rows
            .into_iter()
            .map(|(product_id, name, quantity, revenue_cents)| ProductSalesRow {
                product_id,
                name,
                quantity,
                revenue_cents,
            })
            .collect();
        Ok(top_products(rows))
    }

    /// Everything the admin dashboard shows.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<AdminMetrics, ServiceError> {
        let metrics = AdminMetrics {
            headline: self.headline().await?,
            category_sales: self.category_sales().await?,
            top_products: self.top_products(self.top_products_limit).await?,
        };

        info!(
            categories = metrics.category_sales.len(),
            top_products = metrics.top_products.len(),
            "Admin metrics computed"
        );
        Ok(metrics)
    }
}

/// Line items of `paid` and `shipped` orders whose product still exists.
fn recognized_lines() -> Select<order_item::Entity> {
    order_item::Entity::find()
        .join(JoinType::InnerJoin, order_item::Relation::Order.def())
        .join(JoinType::InnerJoin, order_item::Relation::Product.def())
        .filter(order::Column::Status.is_in(OrderStatus::recognized_values()))
}

/// `price_at_purchase_cents * quantity` of one line item.
fn line_revenue() -> SimpleExpr {
    Expr::col((order_item::Entity, order_item::Column::PriceAtPurchaseCents))
        .mul(Expr::col((order_item::Entity, order_item::Column::Quantity)))
}

/// `CAST(COALESCE(SUM(expr), 0) AS BIGINT)`. Postgres widens sums of
/// BIGINT to NUMERIC, which would not decode as `i64`.
fn sum_as_bigint(expr: impl Into<SimpleExpr>) -> SimpleExpr {
    Func::cast_as(
        Func::coalesce([SimpleExpr::from(Func::sum(expr)), SimpleExpr::from(Expr::val(0i64))]),
        Alias::new("BIGINT"),
    )
    .into()
}
