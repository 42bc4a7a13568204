//! Post-submit fill verification.
//!
//! Compares the position delta the broker actually reported against what the
//! submitted order implies. A delta in the wrong direction is a hard failure
//! however small; a same-direction shortfall is only a partial fill.

use exec_bridge_core::OrderSide;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of verifying one order's fill against position deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FillVerdict {
    FullFill,
    PartialFill { expected: Decimal, actual: Decimal },
    NotFilled,
    DirectionMismatch { expected: Decimal, actual: Decimal },
}

impl FillVerdict {
    /// Only a direction mismatch is a verification failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::DirectionMismatch { .. })
    }
}

/// Classifies the observed position delta for a submitted order.
#[must_use]
pub fn check_fill(
    ticker: &str,
    side: OrderSide,
    quantity_submitted: i64,
    position_before: Decimal,
    position_after: Decimal,
) -> FillVerdict {
    let expected = match side {
        OrderSide::Buy => Decimal::from(quantity_submitted),
        OrderSide::Sell => -Decimal::from(quantity_submitted),
    };
    let actual = position_after - position_before;

    if actual == expected {
        debug!(ticker, %side, %expected, "Fill verified in full");
        return FillVerdict::FullFill;
    }

    if actual.is_zero() {
        info!(ticker, %side, %expected, "No fill observed yet");
        return FillVerdict::NotFilled;
    }

    let same_direction = (actual > Decimal::ZERO) == (expected > Decimal::ZERO);
    if same_direction {
        info!(ticker, %side, %expected, %actual, "Partial fill");
        FillVerdict::PartialFill { expected, actual }
    } else {
        warn!(
            ticker,
            %side,
            %expected,
            %actual,
            "Fill direction mismatch: position moved against the submitted order"
        );
        FillVerdict::DirectionMismatch { expected, actual }
    }
}
