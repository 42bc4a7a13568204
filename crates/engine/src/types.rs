//! Per-order and per-cycle result records.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::fills::FillVerdict;
use exec_bridge_core::OrderSide;

/// A non-error decision not to trade. Always carries a printable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    TradingPaused,
    BelowMinimumQuantity { quantity: i64, minimum: i64 },
    PositionCapReached { held: Decimal, cap: Decimal },
    MissingPrice,
    MissingNav,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TradingPaused => write!(f, "trading paused by circuit breaker"),
            Self::BelowMinimumQuantity { quantity, minimum } => {
                write!(f, "quantity {quantity} below minimum order size {minimum}")
            }
            Self::PositionCapReached { held, cap } => {
                write!(f, "position cap reached: holding {held} of {cap}")
            }
            Self::MissingPrice => write!(f, "no usable price"),
            Self::MissingNav => write!(f, "account NAV unavailable"),
        }
    }
}

/// Terminal state of one dispatch attempt.
#[derive(Debug, Clone, Serialize)]
pub enum DispatchStatus {
    Submitted {
        order_id: String,
        filled_quantity: Decimal,
        filled_price: Decimal,
    },
    Skipped(SkipReason),
    Failed {
        error: String,
    },
}

/// Per-order result record for structured logging and audit.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub ticker: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub stop_price: Option<Decimal>,
    pub audit_tag: String,
    pub status: DispatchStatus,
    /// Populated by post-submit fill verification when observable.
    pub fill: Option<FillVerdict>,
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.status, DispatchStatus::Submitted { .. })
    }
}

/// Aggregate result of one control cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub nav: Decimal,
    pub trading_paused: bool,
    pub outcomes: Vec<DispatchOutcome>,
}

impl CycleReport {
    #[must_use]
    pub fn submitted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_submitted()).count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DispatchStatus::Skipped(_)))
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DispatchStatus::Failed { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn skip_reasons_print_human_readable_text() {
        let reason = SkipReason::BelowMinimumQuantity {
            quantity: 0,
            minimum: 1,
        };
        assert_eq!(reason.to_string(), "quantity 0 below minimum order size 1");

        let reason = SkipReason::PositionCapReached {
            held: dec!(10000),
            cap: dec!(10000),
        };
        assert!(reason.to_string().contains("position cap"));
    }

    #[test]
    fn report_counts_partition_outcomes() {
        let outcome = |status| DispatchOutcome {
            ticker: "T".to_string(),
            side: OrderSide::Buy,
            quantity: 1,
            stop_price: None,
            audit_tag: String::new(),
            status,
            fill: None,
        };

        let report = CycleReport {
            nav: dec!(100000),
            trading_paused: false,
            outcomes: vec![
                outcome(DispatchStatus::Submitted {
                    order_id: "1".to_string(),
                    filled_quantity: dec!(1),
                    filled_price: dec!(10),
                }),
                outcome(DispatchStatus::Skipped(SkipReason::MissingPrice)),
                outcome(DispatchStatus::Failed {
                    error: "boom".to_string(),
                }),
            ],
        };

        assert_eq!(report.submitted_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }
}
