use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle state of an order. Any state may move to any other state.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    Shipped,
}

impl OrderStatus {
    /// Statuses whose totals count as recognized revenue.
    pub const RECOGNIZED: [OrderStatus; 2] = [OrderStatus::Paid, OrderStatus::Shipped];

    /// Stored column values of the recognized statuses.
    pub fn recognized_values() -> Vec<&'static str> {
        Self::RECOGNIZED.iter().map(|s| s.as_str()).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Shipped => "shipped",
        }
    }
}
