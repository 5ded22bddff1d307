//! Presentation of sales aggregates.
//!
//! Grouping, summing and ranking happen in the database; services hand the
//! grouped rows to this module, which converts minor units into two-place
//! decimals and folds uncategorized groups into one labelled bucket.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::money::cents_to_decimal;

/// Line revenue of one `products.category` group, in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRevenueRow {
    pub category: Option<String>,
    pub revenue_cents: i64,
}

/// Units sold and line revenue of one product, in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSalesRow {
    pub product_id: i32,
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub total_users: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub paid_orders: u64,
    /// Sum of `paid` and `shipped` order totals.
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: i32,
    pub name: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Body of `GET /api/admin/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminMetrics {
    #[serde(flatten)]
    pub headline: HeadlineMetrics,
    pub category_sales: Vec<CategorySales>,
    pub top_products: Vec<TopProduct>,
}

/// Presents category groups.
///
/// Null and blank categories are one group, shown as `uncategorized_label`.
/// A product whose category equals the label keeps its own row. Rows are
/// ordered by revenue descending, the uncategorized group first on ties,
/// then by name.
pub fn category_sales(rows: Vec<CategoryRevenueRow>, uncategorized_label: &str) -> Vec<CategorySales> {
    let mut buckets: HashMap<Option<String>, i64> = HashMap::new();

    for row in rows {
        let key = row.category.filter(|c| !c.trim().is_empty());
        let total = buckets.entry(key).or_insert(0);
        *total = total.saturating_add(row.revenue_cents);
    }

    let mut grouped: Vec<(Option<String>, i64)> = buckets.into_iter().collect();
    grouped.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    grouped
        .into_iter()
        .map(|(category, cents)| CategorySales {
            category: category.unwrap_or_else(|| uncategorized_label.to_string()),
            revenue: cents_to_decimal(cents),
        })
        .collect()
}

/// Presents ranked product rows, keeping their order.
pub fn top_products(rows: Vec<ProductSalesRow>) -> Vec<TopProduct> {
    rows.into_iter()
        .map(|row| TopProduct {
            id: row.product_id,
            name: row.name,
            quantity: row.quantity,
            revenue: cents_to_decimal(row.revenue_cents),
        })
        .collect()
}
