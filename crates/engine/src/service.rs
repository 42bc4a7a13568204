//! Bridge service — the periodic control cycle.
//!
//! One cycle runs to completion before the next begins: refresh the account
//! snapshot, record NAV and check the breaker, compute the corrective order
//! set, dispatch sequentially in generation order, and verify each fill
//! against a post-submit snapshot. There is no mid-batch cancellation; a
//! paused breaker blocks future batches, not in-flight orders.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use exec_bridge_broker::AccountSnapshotCache;
use exec_bridge_core::{BridgeConfig, BrokerClient, CyclePlan, TargetProvider};
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::breaker::DrawdownBreaker;
use crate::dispatch::OrderDispatcher;
use crate::fills::check_fill;
use crate::rebalance::calculate_rebalance_orders;
use crate::types::{CycleReport, DispatchOutcome};

pub struct BridgeService {
    account: Arc<AccountSnapshotCache>,
    breaker: Arc<DrawdownBreaker>,
    dispatcher: OrderDispatcher,
    config: BridgeConfig,
}

impl BridgeService {
    #[must_use]
    pub fn new(broker: Arc<dyn BrokerClient>, config: BridgeConfig) -> Self {
        let account = Arc::new(AccountSnapshotCache::new(Arc::clone(&broker)));
        let breaker = Arc::new(DrawdownBreaker::new(config.breaker.clone()));
        let dispatcher = OrderDispatcher::new(
            broker,
            Arc::clone(&account),
            Arc::clone(&breaker),
            config.stops.clone(),
            config.sizing.clone(),
        );

        Self {
            account,
            breaker,
            dispatcher,
            config,
        }
    }

    #[must_use]
    pub fn account(&self) -> &Arc<AccountSnapshotCache> {
        &self.account
    }

    /// The breaker handle, for operator pause/reset.
    #[must_use]
    pub fn breaker(&self) -> &Arc<DrawdownBreaker> {
        &self.breaker
    }

    /// Runs one full cycle over the given plan.
    pub async fn run_cycle(&self, plan: &CyclePlan) -> CycleReport {
        let snapshot = self.account.refresh().await;
        let nav = snapshot.net_liquidation;
        self.account.log_nav_snapshot("cycle_start", nav);
        self.breaker.record_nav(Utc::now(), nav);
        self.breaker.check_and_pause_if_breach(nav);

        let trading_paused = self.breaker.is_trading_paused();
        let mut outcomes = Vec::new();

        // Precomputed signals first, in the order they were given.
        for signal in &plan.signals {
            let before = self.account.position_quantity(&signal.ticker);
            let outcome = self.dispatcher.dispatch(signal).await;
            outcomes.push(self.verify_fill(outcome, before).await);
        }

        // Then corrective orders from the target vector, computed against
        // the cycle-start snapshot.
        let orders = calculate_rebalance_orders(
            &plan.targets,
            &snapshot.positions,
            nav,
            &plan.prices,
            &self.config.rebalance,
        );

        for order in orders {
            let Some(price) = plan.prices.get(&order.ticker).copied() else {
                continue;
            };
            let atr = plan
                .atr_per_share
                .get(&order.ticker)
                .copied()
                .unwrap_or(Decimal::ZERO);

            let before = self.account.position_quantity(&order.ticker);
            let outcome = self
                .dispatcher
                .dispatch_from_delta(&order.ticker, order.quantity, order.side, price, atr, false)
                .await;
            outcomes.push(self.verify_fill(outcome, before).await);
        }

        let report = CycleReport {
            nav,
            trading_paused,
            outcomes,
        };
        info!(
            nav = %report.nav,
            paused = report.trading_paused,
            submitted = report.submitted_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Cycle complete"
        );
        report
    }

    /// Runs cycles on a fixed cadence until the provider is exhausted.
    ///
    /// Provider errors are logged and the loop continues; only `Ok(None)`
    /// ends the run.
    pub async fn run(
        &self,
        mut provider: Box<dyn TargetProvider>,
        poll_interval: Duration,
    ) -> Result<()> {
        info!(
            poll_secs = poll_interval.as_secs(),
            drift_threshold = %self.config.rebalance.drift_threshold_pct,
            max_drawdown = %self.config.breaker.max_1d_drawdown_pct,
            "Bridge service started"
        );

        let mut interval = tokio::time::interval(poll_interval);

        loop {
            interval.tick().await;

            match provider.next_plan().await {
                Ok(Some(plan)) => {
                    self.run_cycle(&plan).await;
                }
                Ok(None) => break,
                Err(e) => error!(error = %e, "Failed to fetch next plan"),
            }
        }

        info!("Bridge service stopped");
        Ok(())
    }

    /// Refreshes the snapshot after a submission and classifies the fill.
    async fn verify_fill(&self, mut outcome: DispatchOutcome, before: Decimal) -> DispatchOutcome {
        if !outcome.is_submitted() {
            return outcome;
        }

        let after = self.account.refresh().await.position_quantity(&outcome.ticker);
        let verdict = check_fill(
            &outcome.ticker,
            outcome.side,
            outcome.quantity,
            before,
            after,
        );
        outcome.fill = Some(verdict);
        outcome
    }
}
