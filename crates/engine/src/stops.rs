//! Smart stop rules — protective stop prices sized from volatility.

use exec_bridge_core::{OrderSide, StopConfig};
use rust_decimal::Decimal;

/// Computes the protective stop for an entry.
///
/// Longs stop below entry by `atr_multiplier × atr_per_share`, floored at
/// `min_stop_price` so the stop stays strictly positive; shorts stop the
/// same distance above entry.
#[must_use]
pub fn compute_smart_stop(
    side: OrderSide,
    entry_price: Decimal,
    atr_per_share: Decimal,
    config: &StopConfig,
) -> Decimal {
    let distance = config.atr_multiplier * atr_per_share;
    match side {
        OrderSide::Buy => (entry_price - distance).max(config.min_stop_price),
        OrderSide::Sell => entry_price + distance,
    }
}

/// Stop distance as a fraction of entry price.
///
/// Recomputing a stop from this fraction and the same entry reproduces
/// [`compute_smart_stop`]'s output: `entry × (1 − pct)` for longs,
/// `entry × (1 + pct)` for shorts.
#[must_use]
pub fn stop_distance_pct(
    side: OrderSide,
    entry_price: Decimal,
    atr_per_share: Decimal,
    config: &StopConfig,
) -> Decimal {
    if entry_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let stop = compute_smart_stop(side, entry_price, atr_per_share, config);
    (entry_price - stop).abs() / entry_price
}
