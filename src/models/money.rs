use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::ServiceError;

const CENTS_PER_UNIT: Decimal = Decimal::ONE_HUNDRED;

/// Converts stored minor units into a two-place decimal amount.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Converts a decimal amount into minor units, rounding half away from zero.
pub fn decimal_to_cents(amount: Decimal) -> Result<i64, ServiceError> {
    amount
        .checked_mul(CENTS_PER_UNIT)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| ServiceError::InvalidInput(format!("Amount out of range: {}", amount)))
}

/// Subtotal of a line item in minor units.
pub fn line_subtotal_cents(price_at_purchase_cents: i64, quantity: i32) -> i64 {
    price_at_purchase_cents.saturating_mul(i64::from(quantity))
}
