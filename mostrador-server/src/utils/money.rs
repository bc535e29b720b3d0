//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored and serialized as `f64`; every sum and product goes
//! through `Decimal` and is rounded to cents (half away from zero).
//!
//! Arithmetic saturates at the `Decimal` bounds instead of panicking, so
//! stored records with absurd amounts still aggregate.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal; non-finite input becomes zero, values beyond
/// the `Decimal` range clamp to its bounds
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(if value > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// Convert Decimal to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 amount to cents
#[inline]
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// quantity × unit price
pub fn line_total(quantity: i64, unit_price: f64) -> f64 {
    to_f64(Decimal::from(quantity).saturating_mul(to_decimal(unit_price)))
}

/// Saturating sum of exact amounts
pub fn sum_decimal<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sum a sequence of amounts exactly
pub fn sum<I: IntoIterator<Item = f64>>(amounts: I) -> f64 {
    to_f64(sum_decimal(amounts.into_iter().map(to_decimal)))
}

/// `max(0, subtotal - discount)`
pub fn discounted_total(subtotal: f64, discount: f64) -> f64 {
    let total = to_decimal(subtotal).saturating_sub(to_decimal(discount));
    to_f64(total.max(Decimal::ZERO))
}

/// Unrounded `part / whole * 100`, 0 when `whole` is 0
pub fn ratio_pct(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    match part
        .checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(pct) => pct,
        None if part.is_sign_negative() == whole.is_sign_negative() => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// `(current - previous) / previous * 100`, 0 when `previous` is 0
pub fn percent_change(current: f64, previous: f64) -> f64 {
    let previous = to_decimal(previous);
    to_f64(ratio_pct(
        to_decimal(current).saturating_sub(previous),
        previous.abs(),
    ))
}

/// `part / whole * 100`, 0 when `whole` is 0
pub fn percentage(part: f64, whole: f64) -> f64 {
    to_f64(ratio_pct(to_decimal(part), to_decimal(whole)))
}
