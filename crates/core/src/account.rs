//! Account state values — balances and positions as reported by the broker.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single position as reported by the broker.
///
/// `quantity` is signed: positive for long, negative for short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRecord {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    /// Marked-to-market value if the broker reports one.
    pub market_value: Option<Decimal>,
}

impl PositionRecord {
    /// Dollar exposure of this position — the broker's mark when present,
    /// else `quantity × average_cost`.
    #[must_use]
    pub fn market_value_or_cost(&self) -> Decimal {
        self.market_value
            .unwrap_or_else(|| self.quantity * self.average_cost)
    }
}

/// Point-in-time account state, replaced wholesale on every refresh.
///
/// Never mutated in place — readers hold an `Arc` to a snapshot that stays
/// internally consistent for as long as they keep it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub net_liquidation: Decimal,
    pub available_funds: Decimal,
    pub margin_utilization: Option<Decimal>,
    pub positions: Vec<PositionRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl AccountSnapshot {
    /// Conservative zero snapshot used when the broker cannot be reached.
    ///
    /// Zero available funds means downstream sizing produces no orders.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            net_liquidation: Decimal::ZERO,
            available_funds: Decimal::ZERO,
            margin_utilization: None,
            positions: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn position(&self, symbol: &str) -> Option<&PositionRecord> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    /// Signed held quantity for `symbol`, zero when the account holds none.
    #[must_use]
    pub fn position_quantity(&self, symbol: &str) -> Decimal {
        self.position(symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot_with(positions: Vec<PositionRecord>) -> AccountSnapshot {
        AccountSnapshot {
            net_liquidation: dec!(100000),
            available_funds: dec!(25000),
            margin_utilization: Some(dec!(0.3)),
            positions,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn market_value_prefers_broker_mark() {
        let pos = PositionRecord {
            symbol: "AAPL".to_string(),
            quantity: dec!(100),
            average_cost: dec!(150),
            market_value: Some(dec!(16000)),
        };
        assert_eq!(pos.market_value_or_cost(), dec!(16000));
    }

    #[test]
    fn market_value_derived_from_cost_when_absent() {
        let pos = PositionRecord {
            symbol: "AAPL".to_string(),
            quantity: dec!(100),
            average_cost: dec!(150),
            market_value: None,
        };
        assert_eq!(pos.market_value_or_cost(), dec!(15000));
    }

    #[test]
    fn market_value_derived_is_negative_for_shorts() {
        let pos = PositionRecord {
            symbol: "TSLA".to_string(),
            quantity: dec!(-50),
            average_cost: dec!(200),
            market_value: None,
        };
        assert_eq!(pos.market_value_or_cost(), dec!(-10000));
    }

    #[test]
    fn empty_snapshot_has_zero_funds() {
        let snap = AccountSnapshot::empty();
        assert_eq!(snap.net_liquidation, Decimal::ZERO);
        assert_eq!(snap.available_funds, Decimal::ZERO);
        assert!(snap.positions.is_empty());
        assert!(snap.margin_utilization.is_none());
    }

    #[test]
    fn position_quantity_zero_for_unknown_symbol() {
        let snap = snapshot_with(vec![PositionRecord {
            symbol: "MSFT".to_string(),
            quantity: dec!(10),
            average_cost: dec!(400),
            market_value: None,
        }]);

        assert_eq!(snap.position_quantity("MSFT"), dec!(10));
        assert_eq!(snap.position_quantity("NVDA"), Decimal::ZERO);
    }
}
