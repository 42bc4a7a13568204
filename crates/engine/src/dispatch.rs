//! Order sizing and dispatch — the only path to the broker.
//!
//! Two entry points converge on the same order-with-stop construction:
//! [`OrderDispatcher::dispatch`] sizes a weight-based signal from NAV, and
//! [`OrderDispatcher::dispatch_from_delta`] takes an already-sized delta.
//! Every outcome is a value, never a raised error: a broker failure on one
//! ticker must not abort its siblings in the batch.

use std::sync::Arc;

use exec_bridge_core::{
    BrokerClient, LiveSignal, OrderSide, OrderTicket, OrderType, SizingConfig, StopConfig,
    AUDIT_TAG_DIRECT, AUDIT_TAG_PROPAGATED,
};
use exec_bridge_broker::AccountSnapshotCache;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::breaker::DrawdownBreaker;
use crate::stops::compute_smart_stop;
use crate::types::{DispatchOutcome, DispatchStatus, SkipReason};

pub struct OrderDispatcher {
    broker: Arc<dyn BrokerClient>,
    account: Arc<AccountSnapshotCache>,
    breaker: Arc<DrawdownBreaker>,
    stops: StopConfig,
    sizing: SizingConfig,
}

impl OrderDispatcher {
    #[must_use]
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        account: Arc<AccountSnapshotCache>,
        breaker: Arc<DrawdownBreaker>,
        stops: StopConfig,
        sizing: SizingConfig,
    ) -> Self {
        Self {
            broker,
            account,
            breaker,
            stops,
            sizing,
        }
    }

    /// Sizes and submits a weight-based signal.
    ///
    /// Quantity is `NAV × weight / entry_price`, capped by what available
    /// funds can buy and by the per-ticker position limit.
    pub async fn dispatch(&self, signal: &LiveSignal) -> DispatchOutcome {
        let audit_tag = signal.audit_tag();

        if signal.entry_price <= Decimal::ZERO {
            return self.skip(
                &signal.ticker,
                signal.direction,
                0,
                audit_tag,
                SkipReason::MissingPrice,
            );
        }

        let nav = self.account.net_liquidation();
        if nav <= Decimal::ZERO {
            return self.skip(
                &signal.ticker,
                signal.direction,
                0,
                audit_tag,
                SkipReason::MissingNav,
            );
        }

        let desired = nav * signal.weight / signal.entry_price;
        let affordable = self.account.available_funds() / signal.entry_price;
        let capped = desired.min(affordable).min(self.sizing.max_position_size);
        let quantity = capped.floor().to_i64().unwrap_or(0);

        self.dispatch_from_delta(
            &signal.ticker,
            quantity,
            signal.direction,
            signal.entry_price,
            signal.atr_per_share,
            signal.is_propagated,
        )
        .await
    }

    /// Submits an already-sized delta trade.
    ///
    /// For buys, quantity is capped so the resulting position stays within
    /// the per-ticker limit given what the snapshot says is already held.
    pub async fn dispatch_from_delta(
        &self,
        ticker: &str,
        quantity: i64,
        side: OrderSide,
        entry_price: Decimal,
        atr_per_share: Decimal,
        is_propagated: bool,
    ) -> DispatchOutcome {
        let audit_tag = if is_propagated {
            AUDIT_TAG_PROPAGATED
        } else {
            AUDIT_TAG_DIRECT
        };

        if self.breaker.is_trading_paused() {
            return self.skip(ticker, side, quantity, audit_tag, SkipReason::TradingPaused);
        }

        if entry_price <= Decimal::ZERO {
            return self.skip(ticker, side, quantity, audit_tag, SkipReason::MissingPrice);
        }

        if quantity < self.sizing.min_order_quantity {
            return self.skip(
                ticker,
                side,
                quantity,
                audit_tag,
                SkipReason::BelowMinimumQuantity {
                    quantity,
                    minimum: self.sizing.min_order_quantity,
                },
            );
        }

        let mut quantity = quantity;
        if side == OrderSide::Buy {
            let held = self.account.position_quantity(ticker);
            if held >= self.sizing.max_position_size {
                return self.skip(
                    ticker,
                    side,
                    quantity,
                    audit_tag,
                    SkipReason::PositionCapReached {
                        held,
                        cap: self.sizing.max_position_size,
                    },
                );
            }

            let room = (self.sizing.max_position_size - held)
                .floor()
                .to_i64()
                .unwrap_or(0);
            if quantity > room {
                info!(
                    ticker,
                    requested = quantity,
                    capped = room,
                    "Buy quantity capped by position limit"
                );
                quantity = room;
            }
            if quantity < self.sizing.min_order_quantity {
                return self.skip(
                    ticker,
                    side,
                    quantity,
                    audit_tag,
                    SkipReason::BelowMinimumQuantity {
                        quantity,
                        minimum: self.sizing.min_order_quantity,
                    },
                );
            }
        }

        let stop_price = compute_smart_stop(side, entry_price, atr_per_share, &self.stops);

        let ticket = OrderTicket {
            ticker: ticker.to_string(),
            quantity,
            side,
            order_type: OrderType::Limit { price: entry_price },
            stop_price: Some(stop_price),
            audit_tag: audit_tag.to_string(),
        };

        match self.broker.submit_order(&ticket).await {
            Ok(ack) => {
                info!(
                    order_id = ack.order_id,
                    ticker,
                    side = %side,
                    quantity,
                    stop = %stop_price,
                    audit_tag,
                    "Order submitted"
                );
                DispatchOutcome {
                    ticker: ticker.to_string(),
                    side,
                    quantity,
                    stop_price: Some(stop_price),
                    audit_tag: audit_tag.to_string(),
                    status: DispatchStatus::Submitted {
                        order_id: ack.order_id,
                        filled_quantity: ack.filled_quantity,
                        filled_price: ack.filled_price,
                    },
                    fill: None,
                }
            }
            Err(e) => {
                warn!(ticker, side = %side, quantity, error = %e, "Order submission failed");
                DispatchOutcome {
                    ticker: ticker.to_string(),
                    side,
                    quantity,
                    stop_price: Some(stop_price),
                    audit_tag: audit_tag.to_string(),
                    status: DispatchStatus::Failed {
                        error: e.to_string(),
                    },
                    fill: None,
                }
            }
        }
    }

    fn skip(
        &self,
        ticker: &str,
        side: OrderSide,
        quantity: i64,
        audit_tag: &str,
        reason: SkipReason,
    ) -> DispatchOutcome {
        info!(ticker, side = %side, quantity, reason = %reason, "Order skipped");
        DispatchOutcome {
            ticker: ticker.to_string(),
            side,
            quantity,
            stop_price: None,
            audit_tag: audit_tag.to_string(),
            status: DispatchStatus::Skipped(reason),
            fill: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exec_bridge_broker::MockBroker;
    use exec_bridge_core::BreakerConfig;
    use rust_decimal_macros::dec;

    struct Fixture {
        broker: Arc<MockBroker>,
        dispatcher: OrderDispatcher,
    }

    async fn fixture(sizing: SizingConfig) -> Fixture {
        let broker = Arc::new(MockBroker::default());
        broker.set_account(dec!(100000), dec!(100000));
        let account = Arc::new(AccountSnapshotCache::new(broker.clone()));
        account.refresh().await;
        let breaker = Arc::new(DrawdownBreaker::new(BreakerConfig::default()));
        let dispatcher = OrderDispatcher::new(
            broker.clone(),
            account,
            breaker,
            StopConfig::default(),
            sizing,
        );
        Fixture { broker, dispatcher }
    }

    fn signal(ticker: &str, weight: Decimal, entry: Decimal) -> LiveSignal {
        LiveSignal {
            ticker: ticker.to_string(),
            weight,
            direction: OrderSide::Buy,
            is_propagated: false,
            atr_per_share: dec!(2),
            entry_price: entry,
        }
    }

    #[tokio::test]
    async fn available_funds_cap_limits_quantity() {
        let fx = fixture(SizingConfig::default()).await;
        fx.broker.set_account(dec!(100000), dec!(1000));
        // Re-refresh to pick up the reduced funds.
        fx.dispatcher.account.refresh().await;

        // Weight asks for $50k of a $100 stock; funds only cover 10 shares.
        let outcome = fx.dispatcher.dispatch(&signal("AAPL", dec!(0.5), dec!(100))).await;

        assert!(outcome.is_submitted());
        assert_eq!(outcome.quantity, 10);
    }

    #[tokio::test]
    async fn below_minimum_quantity_is_skipped_without_broker_call() {
        let fx = fixture(SizingConfig::default()).await;

        // $100k NAV × tiny weight at a high price rounds down to zero shares.
        let outcome = fx
            .dispatcher
            .dispatch(&signal("BRK", dec!(0.000001), dec!(700000)))
            .await;

        assert!(matches!(
            outcome.status,
            DispatchStatus::Skipped(SkipReason::BelowMinimumQuantity { .. })
        ));
        assert!(fx.broker.submissions().is_empty());
    }

    #[tokio::test]
    async fn missing_price_is_a_skip_not_an_error() {
        let fx = fixture(SizingConfig::default()).await;
        let outcome = fx.dispatcher.dispatch(&signal("XX", dec!(0.5), Decimal::ZERO)).await;

        assert!(matches!(
            outcome.status,
            DispatchStatus::Skipped(SkipReason::MissingPrice)
        ));
    }

    #[tokio::test]
    async fn zero_nav_is_a_skip() {
        let fx = fixture(SizingConfig::default()).await;
        fx.broker.set_account(Decimal::ZERO, Decimal::ZERO);
        fx.dispatcher.account.refresh().await;

        let outcome = fx.dispatcher.dispatch(&signal("AAPL", dec!(0.5), dec!(100))).await;
        assert!(matches!(
            outcome.status,
            DispatchStatus::Skipped(SkipReason::MissingNav)
        ));
    }

    #[tokio::test]
    async fn buy_capped_by_held_position() {
        let fx = fixture(SizingConfig::default().with_max_position_size(dec!(100))).await;
        fx.broker.set_position("AAPL", dec!(90), dec!(100));
        fx.dispatcher.account.refresh().await;

        // Asked for 50 more but only 10 shares of room remain.
        let outcome = fx
            .dispatcher
            .dispatch_from_delta("AAPL", 50, OrderSide::Buy, dec!(100), dec!(2), false)
            .await;

        assert!(outcome.is_submitted());
        assert_eq!(outcome.quantity, 10);
    }

    #[tokio::test]
    async fn buy_at_position_cap_is_skipped_entirely() {
        let fx = fixture(SizingConfig::default().with_max_position_size(dec!(100))).await;
        fx.broker.set_position("AAPL", dec!(100), dec!(100));
        fx.dispatcher.account.refresh().await;

        let outcome = fx
            .dispatcher
            .dispatch_from_delta("AAPL", 50, OrderSide::Buy, dec!(100), dec!(2), false)
            .await;

        assert!(matches!(
            outcome.status,
            DispatchStatus::Skipped(SkipReason::PositionCapReached { .. })
        ));
        assert!(fx.broker.submissions().is_empty());
    }

    #[tokio::test]
    async fn sell_is_not_position_capped() {
        let fx = fixture(SizingConfig::default().with_max_position_size(dec!(100))).await;
        fx.broker.set_position("AAPL", dec!(100), dec!(100));
        fx.dispatcher.account.refresh().await;

        let outcome = fx
            .dispatcher
            .dispatch_from_delta("AAPL", 40, OrderSide::Sell, dec!(100), dec!(2), false)
            .await;

        assert!(outcome.is_submitted());
        assert_eq!(outcome.quantity, 40);
    }

    #[tokio::test]
    async fn paused_breaker_blocks_before_any_broker_call() {
        let fx = fixture(SizingConfig::default()).await;
        fx.dispatcher.breaker.pause();

        let outcome = fx
            .dispatcher
            .dispatch_from_delta("AAPL", 10, OrderSide::Buy, dec!(100), dec!(2), false)
            .await;

        assert!(matches!(
            outcome.status,
            DispatchStatus::Skipped(SkipReason::TradingPaused)
        ));
        assert!(fx.broker.submissions().is_empty());
    }

    #[tokio::test]
    async fn broker_error_becomes_failed_outcome() {
        let fx = fixture(SizingConfig::default()).await;
        fx.broker.fail_ticker("GME");

        let outcome = fx
            .dispatcher
            .dispatch_from_delta("GME", 10, OrderSide::Buy, dec!(100), dec!(2), false)
            .await;

        match outcome.status {
            DispatchStatus::Failed { error } => assert!(error.contains("GME")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submitted_order_carries_stop_and_audit_tag() {
        let fx = fixture(SizingConfig::default()).await;

        let outcome = fx
            .dispatcher
            .dispatch_from_delta("NVDA", 10, OrderSide::Buy, dec!(140), dec!(3), true)
            .await;

        assert!(outcome.is_submitted());
        assert_eq!(outcome.stop_price, Some(dec!(134)));
        assert_eq!(outcome.audit_tag, AUDIT_TAG_PROPAGATED);

        let tickets = fx.broker.submissions();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].stop_price, Some(dec!(134)));
        assert_eq!(tickets[0].audit_tag, AUDIT_TAG_PROPAGATED);
    }
}
