use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One order as presented to the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: i32,
    pub user_id: Option<i32>,
    /// Null when the placing user no longer exists.
    pub user_email: Option<String>,
    pub status: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Formatted `%Y-%m-%d %H:%M:%S`.
    pub created_at: String,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product_id: i32,
    /// Null when the product has been deleted.
    pub product_name: Option<String>,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_at_purchase: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Body of `PATCH /api/admin/orders/:id`.
///
/// `status` stays loosely typed so a missing or non-string value is reported
/// as an invalid status rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderStatusUpdate {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

impl OrderStatusUpdate {
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().and_then(|v| v.as_str())
    }
}

/// Response of a successful status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdated {
    pub message: String,
    pub order_id: i32,
    pub status: String,
}
