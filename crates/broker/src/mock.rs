//! Scripted in-memory broker for tests.
//!
//! Makes zero network calls. Account state, per-ticker prices, fill
//! behavior, and failures are all settable from the test body; every
//! accepted ticket is applied to the held positions so a later
//! `get_account_info` observes the fill.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use exec_bridge_core::{
    AccountSnapshot, BrokerClient, OrderAck, OrderSide, OrderStatus, OrderTicket, OrderType,
    PositionRecord,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;

#[derive(Default)]
struct MockState {
    net_liquidation: Decimal,
    available_funds: Decimal,
    margin_utilization: Option<Decimal>,
    positions: HashMap<String, PositionRecord>,
    prices: HashMap<String, Decimal>,
    fail_account: bool,
    failing_tickers: Vec<String>,
    /// Overrides the filled quantity for a ticker's next submission.
    fill_quantity_overrides: HashMap<String, Decimal>,
    submissions: Vec<OrderTicket>,
}

#[derive(Default)]
pub struct MockBroker {
    state: RwLock<MockState>,
}

impl MockBroker {
    pub fn set_account(&self, net_liquidation: Decimal, available_funds: Decimal) {
        let mut state = self.state.write();
        state.net_liquidation = net_liquidation;
        state.available_funds = available_funds;
    }

    pub fn set_position(&self, symbol: &str, quantity: Decimal, average_cost: Decimal) {
        let mut state = self.state.write();
        state.positions.insert(
            symbol.to_string(),
            PositionRecord {
                symbol: symbol.to_string(),
                quantity,
                average_cost,
                market_value: None,
            },
        );
    }

    pub fn set_price(&self, ticker: &str, price: Decimal) {
        self.state.write().prices.insert(ticker.to_string(), price);
    }

    pub fn fail_account_requests(&self, fail: bool) {
        self.state.write().fail_account = fail;
    }

    /// All submissions for `ticker` will error until cleared.
    pub fn fail_ticker(&self, ticker: &str) {
        self.state.write().failing_tickers.push(ticker.to_string());
    }

    /// The next fill for `ticker` reports (and applies) `quantity` instead of
    /// the submitted amount. A negative value simulates a wrong-direction fill.
    pub fn override_fill_quantity(&self, ticker: &str, quantity: Decimal) {
        self.state
            .write()
            .fill_quantity_overrides
            .insert(ticker.to_string(), quantity);
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<OrderTicket> {
        self.state.read().submissions.clone()
    }

    fn fill_price(state: &MockState, ticket: &OrderTicket) -> Decimal {
        match &ticket.order_type {
            OrderType::Limit { price } => *price,
            OrderType::Market => state
                .prices
                .get(&ticket.ticker)
                .copied()
                .unwrap_or(Decimal::ZERO),
        }
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    async fn get_account_info(&self) -> Result<AccountSnapshot> {
        let state = self.state.read();
        if state.fail_account {
            anyhow::bail!("mock broker: account endpoint unavailable");
        }

        Ok(AccountSnapshot {
            net_liquidation: state.net_liquidation,
            available_funds: state.available_funds,
            margin_utilization: state.margin_utilization,
            positions: state.positions.values().cloned().collect(),
            fetched_at: Utc::now(),
        })
    }

    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderAck> {
        let mut state = self.state.write();
        if state.failing_tickers.iter().any(|t| t == &ticket.ticker) {
            anyhow::bail!("mock broker: order rejected for {}", ticket.ticker);
        }

        state.submissions.push(ticket.clone());

        let price = Self::fill_price(&state, ticket);
        let submitted = Decimal::from(ticket.quantity);
        let filled = state
            .fill_quantity_overrides
            .remove(&ticket.ticker)
            .unwrap_or(submitted);

        let signed = match ticket.side {
            OrderSide::Buy => filled,
            OrderSide::Sell => -filled,
        };

        let entry = state
            .positions
            .entry(ticket.ticker.clone())
            .or_insert_with(|| PositionRecord {
                symbol: ticket.ticker.clone(),
                quantity: Decimal::ZERO,
                average_cost: price,
                market_value: None,
            });
        entry.quantity += signed;
        if entry.quantity.is_zero() {
            state.positions.remove(&ticket.ticker);
        }

        Ok(OrderAck {
            order_id: format!("MOCK-{}", uuid::Uuid::new_v4()),
            status: if filled == submitted {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            },
            filled_quantity: filled,
            filled_price: price,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
