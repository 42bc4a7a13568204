//! Bridge configuration with documented defaults.
//!
//! Policy constants are injected through these structs rather than read
//! ambiently, so each component stays testable in isolation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub stops: StopConfig,
    #[serde(default)]
    pub rebalance: RebalanceConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
}

/// Broker backend selected at startup by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerBackend {
    Mock,
    Paper,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub backend: BrokerBackend,
    /// Base URL for the live backend's REST API.
    pub base_url: String,
    /// Starting cash for the paper backend.
    pub paper_starting_cash: Decimal,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            backend: BrokerBackend::Paper,
            base_url: "http://127.0.0.1:9300".to_string(),
            paper_starting_cash: Decimal::from(100_000),
        }
    }
}

/// Smart-stop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopConfig {
    /// Stop distance as a multiple of ATR. Default: 2.
    pub atr_multiplier: Decimal,
    /// Floor for long stops so they stay strictly positive. Default: 0.01.
    pub min_stop_price: Decimal,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            atr_multiplier: Decimal::from(2),
            min_stop_price: Decimal::new(1, 2), // 0.01
        }
    }
}

impl StopConfig {
    #[must_use]
    pub fn with_atr_multiplier(mut self, multiplier: Decimal) -> Self {
        self.atr_multiplier = multiplier;
        self
    }
}

/// Rebalance order generation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceConfig {
    /// Relative drift that must be exceeded before a ticker is corrected.
    /// Default: 0.05.
    pub drift_threshold_pct: Decimal,
    /// Smallest corrective trade worth sending, in dollars. Default: $500.
    pub min_trade_dollar_value: Decimal,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            drift_threshold_pct: Decimal::new(5, 2), // 0.05
            min_trade_dollar_value: Decimal::from(500),
        }
    }
}

impl RebalanceConfig {
    #[must_use]
    pub fn with_drift_threshold(mut self, threshold: Decimal) -> Self {
        self.drift_threshold_pct = threshold;
        self
    }

    #[must_use]
    pub fn with_min_trade_dollar_value(mut self, value: Decimal) -> Self {
        self.min_trade_dollar_value = value;
        self
    }
}

/// Order sizing caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Orders below this share count are skipped. Default: 1.
    pub min_order_quantity: i64,
    /// Maximum held quantity per ticker, in shares. Default: 10,000.
    pub max_position_size: Decimal,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_order_quantity: 1,
            max_position_size: Decimal::from(10_000),
        }
    }
}

impl SizingConfig {
    #[must_use]
    pub fn with_max_position_size(mut self, size: Decimal) -> Self {
        self.max_position_size = size;
        self
    }
}

/// Drawdown circuit breaker parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// When false, the breaker never reports trading as paused.
    pub enabled: bool,
    /// 1-day drawdown (as a positive fraction) that trips the breaker.
    /// Default: 0.05.
    pub max_1d_drawdown_pct: Decimal,
    /// Rolling NAV samples retained; oldest evicted past this cap.
    /// Default: 500.
    pub nav_history_cap: usize,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_1d_drawdown_pct: Decimal::new(5, 2), // 0.05
            nav_history_cap: 500,
        }
    }
}

impl BreakerConfig {
    #[must_use]
    pub fn with_max_drawdown(mut self, pct: Decimal) -> Self {
        self.max_1d_drawdown_pct = pct;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
