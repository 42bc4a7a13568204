//! Drawdown circuit breaker — the account-wide trading interlock.
//!
//! Tracks a rolling window of NAV samples and latches into a paused state
//! when the 1-day drawdown breaches the configured limit. The latch is
//! one-way: nothing resumes trading except an explicit [`reset`], no matter
//! how far NAV recovers.
//!
//! [`reset`]: DrawdownBreaker::reset

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use exec_bridge_core::BreakerConfig;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// One NAV observation in the rolling history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavSample {
    pub timestamp: DateTime<Utc>,
    pub net_liquidation: Decimal,
}

/// Returned when an operation requires trading to be active.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("trading paused by drawdown circuit breaker; manual reset required")]
pub struct BreakerTripped;

#[derive(Debug)]
struct BreakerState {
    paused: bool,
    history: VecDeque<NavSample>,
}

/// Snapshot of breaker state for operational visibility.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStats {
    pub enabled: bool,
    pub paused: bool,
    pub sample_count: usize,
    pub oldest_sample: Option<DateTime<Utc>>,
    pub newest_sample: Option<DateTime<Utc>>,
}

pub struct DrawdownBreaker {
    config: BreakerConfig,
    state: RwLock<BreakerState>,
}

impl DrawdownBreaker {
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(BreakerState {
                paused: false,
                history: VecDeque::new(),
            }),
        }
    }

    /// Appends a NAV observation, evicting the oldest past the history cap.
    pub fn record_nav(&self, timestamp: DateTime<Utc>, net_liquidation: Decimal) {
        let mut state = self.state.write();
        state.history.push_back(NavSample {
            timestamp,
            net_liquidation,
        });
        while state.history.len() > self.config.nav_history_cap {
            state.history.pop_front();
        }
    }

    /// 1-day drawdown of `current_nav` against the sample closest to 24h ago.
    ///
    /// Returns `None` ("unknown") with no history, or when the reference NAV
    /// is non-positive. Unknown never trips the breaker — fail-closed
    /// protection for unreachable account state lives in the snapshot cache.
    #[must_use]
    pub fn check_1d_drawdown(&self, current_nav: Decimal) -> Option<Decimal> {
        let state = self.state.read();
        let target = Utc::now() - Duration::hours(24);

        let reference = state
            .history
            .iter()
            .min_by_key(|sample| (sample.timestamp - target).num_seconds().abs())?;

        if reference.net_liquidation <= Decimal::ZERO {
            return None;
        }

        Some((current_nav - reference.net_liquidation) / reference.net_liquidation)
    }

    /// Latches into the paused state iff the 1-day drawdown breaches the
    /// configured limit. Returns true exactly when the breach fired.
    pub fn check_and_pause_if_breach(&self, current_nav: Decimal) -> bool {
        let Some(drawdown) = self.check_1d_drawdown(current_nav) else {
            return false;
        };

        if drawdown <= -self.config.max_1d_drawdown_pct {
            self.state.write().paused = true;
            warn!(
                %drawdown,
                limit = %self.config.max_1d_drawdown_pct,
                "Drawdown breach: circuit breaker paused"
            );
            return true;
        }
        false
    }

    /// True when the breaker is enabled and latched, whether by breach or
    /// manual [`pause`](Self::pause).
    #[must_use]
    pub fn is_trading_paused(&self) -> bool {
        self.config.enabled && self.state.read().paused
    }

    /// Returns `Ok(())` only while trading is active.
    pub fn ensure_active(&self) -> Result<(), BreakerTripped> {
        if self.is_trading_paused() {
            Err(BreakerTripped)
        } else {
            Ok(())
        }
    }

    /// Manually latches the breaker. Same one-way semantics as a breach.
    pub fn pause(&self) {
        self.state.write().paused = true;
        warn!("Circuit breaker manually paused");
    }

    /// The only path back to normal operation. NAV history is retained.
    pub fn reset(&self) {
        self.state.write().paused = false;
        info!("Circuit breaker reset");
    }

    #[must_use]
    pub fn stats(&self) -> BreakerStats {
        let state = self.state.read();
        BreakerStats {
            enabled: self.config.enabled,
            paused: state.paused,
            sample_count: state.history.len(),
            oldest_sample: state.history.front().map(|s| s.timestamp),
            newest_sample: state.history.back().map(|s| s.timestamp),
        }
    }
}
