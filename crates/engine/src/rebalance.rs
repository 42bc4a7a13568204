//! Rebalance policy — minimal corrective orders from target weights.
//!
//! Pure and deterministic: same inputs produce the same orders in the same
//! (ticker-sorted) sequence, regardless of map iteration order.

use std::collections::{BTreeSet, HashMap};

use exec_bridge_core::{OrderSide, PositionRecord, RebalanceConfig, TargetWeights};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A corrective trade derived from current vs. target exposure.
///
/// Only materializes when `|drift|` exceeds the threshold, `|delta_dollars|`
/// meets the minimum trade value, and a usable positive price exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceOrder {
    pub ticker: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub delta_dollars: Decimal,
    pub drift: Decimal,
    pub target_weight: Decimal,
    pub current_weight: Decimal,
}

/// Computes the corrective order set for the union of target and held tickers.
///
/// Sub-threshold drift and sub-minimum dollar deltas are ignored; a ticker
/// without a usable positive price is skipped silently rather than treated
/// as an error.
#[must_use]
pub fn calculate_rebalance_orders(
    targets: &TargetWeights,
    positions: &[PositionRecord],
    nav: Decimal,
    prices: &HashMap<String, Decimal>,
    config: &RebalanceConfig,
) -> Vec<RebalanceOrder> {
    if nav <= Decimal::ZERO {
        warn!(%nav, "Rebalance skipped: NAV unavailable");
        return Vec::new();
    }

    let held: HashMap<&str, &PositionRecord> =
        positions.iter().map(|p| (p.symbol.as_str(), p)).collect();

    let mut tickers: BTreeSet<&str> = targets.keys().map(String::as_str).collect();
    tickers.extend(held.keys());

    let mut orders = Vec::new();

    for ticker in tickers {
        let target_weight = targets.get(ticker).copied().unwrap_or(Decimal::ZERO);
        let target_dollars = nav * target_weight;

        let price = prices
            .get(ticker)
            .copied()
            .filter(|p| *p > Decimal::ZERO);

        let current_dollars = held.get(ticker).map_or(Decimal::ZERO, |pos| {
            match (pos.market_value, price) {
                (Some(value), _) => value,
                (None, Some(px)) => pos.quantity * px,
                (None, None) => pos.quantity * pos.average_cost,
            }
        });

        let drift = if target_dollars > Decimal::ZERO {
            current_dollars / target_dollars - Decimal::ONE
        } else if !current_dollars.is_zero() {
            // No target but live exposure: force consideration of a full exit.
            Decimal::ONE
        } else {
            continue;
        };

        if drift.abs() <= config.drift_threshold_pct {
            continue;
        }

        let delta_dollars = target_dollars - current_dollars;
        if delta_dollars.abs() < config.min_trade_dollar_value {
            continue;
        }

        let Some(price) = price else {
            debug!(ticker, "Rebalance skipping ticker: no usable price");
            continue;
        };

        let Some(quantity) = (delta_dollars.abs() / price).round().to_i64() else {
            continue;
        };
        if quantity < 1 {
            continue;
        }

        let side = if delta_dollars > Decimal::ZERO {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };

        orders.push(RebalanceOrder {
            ticker: ticker.to_string(),
            side,
            quantity,
            delta_dollars,
            drift,
            target_weight,
            current_weight: current_dollars / nav,
        });
    }

    orders
}
