//! Unit price calculation.
//!
//! Phase prices and coupon values are stored in major currency units; everything leaving this module is in cents.
use ticket_common::Cents;

use crate::db_types::Cupon;

/// Computes the price of a single ticket given the phase's base price (major units) and an optional coupon.
///
/// * No coupon: the base price.
/// * Flat coupon: the coupon value *replaces* the base price. It is not subtracted from it.
/// * Percentage coupon: `base * (1 - value/100)`.
///
/// The result is not clamped. Validating coupon values is the responsibility of whoever creates them.
pub fn compute_unit_price(base_price: i64, cupon: Option<&Cupon>) -> Cents {
    match cupon {
        None => Cents::from_major(base_price),
        Some(c) if c.percentage => percentage_price(base_price, c.value),
        Some(c) => Cents::from_major(c.value),
    }
}

// base*100 cents times (100 - pct)/100 is always a whole number of cents, so no rounding step is needed
fn percentage_price(base_price: i64, percent_off: i64) -> Cents {
    Cents::from(base_price * (100 - percent_off))
}
