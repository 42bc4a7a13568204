//! Upstream decision inputs — target weights and per-ticker live signals.
//!
//! Both are already-made, untrusted decisions: the bridge never re-derives
//! *why* a position is wanted, only *how much* and *how safely*.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::events::{OrderSide, AUDIT_TAG_DIRECT, AUDIT_TAG_PROPAGATED};

/// Desired portfolio weights as fractions of NAV, keyed by ticker.
///
/// May omit tickers (meaning exit) and is not guaranteed to sum to ≤ 1.
pub type TargetWeights = HashMap<String, Decimal>;

/// A single actionable decision from the research pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSignal {
    pub ticker: String,
    /// Desired exposure as a fraction of NAV.
    pub weight: Decimal,
    pub direction: OrderSide,
    /// True when the decision was inferred through a derived relationship
    /// rather than observed directly.
    pub is_propagated: bool,
    pub atr_per_share: Decimal,
    pub entry_price: Decimal,
}

impl LiveSignal {
    /// The provenance tag this signal's orders must carry.
    #[must_use]
    pub fn audit_tag(&self) -> &'static str {
        if self.is_propagated {
            AUDIT_TAG_PROPAGATED
        } else {
            AUDIT_TAG_DIRECT
        }
    }
}

/// One cycle's worth of upstream input: a target-weight vector with market
/// data, precomputed per-ticker signals, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CyclePlan {
    #[serde(default)]
    pub targets: TargetWeights,
    /// Usable prices per ticker; a missing or non-positive entry means that
    /// ticker cannot be sized this cycle.
    #[serde(default)]
    pub prices: HashMap<String, Decimal>,
    #[serde(default)]
    pub atr_per_share: HashMap<String, Decimal>,
    #[serde(default)]
    pub signals: Vec<LiveSignal>,
}

impl CyclePlan {
    #[must_use]
    pub fn from_targets(
        targets: TargetWeights,
        prices: HashMap<String, Decimal>,
        atr_per_share: HashMap<String, Decimal>,
    ) -> Self {
        Self {
            targets,
            prices,
            atr_per_share,
            signals: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_signals(signals: Vec<LiveSignal>) -> Self {
        Self {
            signals,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn propagated_signal_selects_propagated_tag() {
        let signal = LiveSignal {
            ticker: "AMD".to_string(),
            weight: dec!(0.1),
            direction: OrderSide::Buy,
            is_propagated: true,
            atr_per_share: dec!(2.5),
            entry_price: dec!(120),
        };
        assert_eq!(signal.audit_tag(), AUDIT_TAG_PROPAGATED);
    }

    #[test]
    fn direct_signal_selects_direct_tag() {
        let signal = LiveSignal {
            ticker: "AMD".to_string(),
            weight: dec!(0.1),
            direction: OrderSide::Buy,
            is_propagated: false,
            atr_per_share: dec!(2.5),
            entry_price: dec!(120),
        };
        assert_eq!(signal.audit_tag(), AUDIT_TAG_DIRECT);
    }

    #[test]
    fn empty_plan_reports_empty() {
        assert!(CyclePlan::default().is_empty());

        let mut targets = TargetWeights::new();
        targets.insert("SPY".to_string(), dec!(0.6));
        let plan = CyclePlan::from_targets(targets, HashMap::new(), HashMap::new());
        assert!(!plan.is_empty());
    }
}
