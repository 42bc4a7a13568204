//! Paper trading backend.
//!
//! Simulates fills against an in-memory cash/positions ledger without
//! touching any brokerage. Useful for exercising the full dispatch pipeline
//! before pointing the bridge at a live account.

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
use tracing::info;

struct PaperPosition {
    quantity: Decimal,
    average_cost: Decimal,
}

struct PaperLedger {
    cash: Decimal,
    positions: HashMap<String, PaperPosition>,
    last_prices: HashMap<String, Decimal>,
}

/// Simulated broker. All fills are immediate and complete at the limit
/// price (or the last marked price for market orders).
pub struct PaperBroker {
    ledger: RwLock<PaperLedger>,
}

impl PaperBroker {
    #[must_use]
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            ledger: RwLock::new(PaperLedger {
                cash: starting_cash,
                positions: HashMap::new(),
                last_prices: HashMap::new(),
            }),
        }
    }

    /// Updates the mark used for market-order fills and position valuation.
    pub fn set_last_price(&self, ticker: &str, price: Decimal) {
        self.ledger
            .write()
            .last_prices
            .insert(ticker.to_string(), price);
    }

    fn mark(ledger: &PaperLedger, symbol: &str, fallback: Decimal) -> Decimal {
        ledger.last_prices.get(symbol).copied().unwrap_or(fallback)
    }
}

#[async_trait]
impl BrokerClient for PaperBroker {
    async fn get_account_info(&self) -> Result<AccountSnapshot> {
        let ledger = self.ledger.read();

        let positions: Vec<PositionRecord> = ledger
            .positions
            .iter()
            .map(|(symbol, pos)| {
                let mark = Self::mark(&ledger, symbol, pos.average_cost);
                PositionRecord {
                    symbol: symbol.clone(),
                    quantity: pos.quantity,
                    average_cost: pos.average_cost,
                    market_value: Some(pos.quantity * mark),
                }
            })
            .collect();

        let marked: Decimal = positions.iter().map(PositionRecord::market_value_or_cost).sum();

        Ok(AccountSnapshot {
            net_liquidation: ledger.cash + marked,
            available_funds: ledger.cash,
            margin_utilization: None,
            positions,
            fetched_at: Utc::now(),
        })
    }

    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderAck> {
        let mut ledger = self.ledger.write();

        let fill_price = match &ticket.order_type {
            OrderType::Limit { price } => *price,
            OrderType::Market => {
                let Some(price) = ledger.last_prices.get(&ticket.ticker).copied() else {
                    anyhow::bail!("no usable price for market order on {}", ticket.ticker);
                };
                price
            }
        };

        let quantity = Decimal::from(ticket.quantity);
        let notional = quantity * fill_price;

        match ticket.side {
            OrderSide::Buy => {
                ledger.cash -= notional;
                let pos = ledger
                    .positions
                    .entry(ticket.ticker.clone())
                    .or_insert(PaperPosition {
                        quantity: Decimal::ZERO,
                        average_cost: fill_price,
                    });
                let total_cost = pos.average_cost * pos.quantity + notional;
                pos.quantity += quantity;
                if !pos.quantity.is_zero() {
                    pos.average_cost = total_cost / pos.quantity;
                }
            }
            OrderSide::Sell => {
                ledger.cash += notional;
                let pos = ledger
                    .positions
                    .entry(ticket.ticker.clone())
                    .or_insert(PaperPosition {
                        quantity: Decimal::ZERO,
                        average_cost: fill_price,
                    });
                pos.quantity -= quantity;
                if pos.quantity.is_zero() {
                    ledger.positions.remove(&ticket.ticker);
                }
            }
        }

        let ack = OrderAck {
            order_id: format!("PAPER-{}", Utc::now().timestamp_millis()),
            status: OrderStatus::Filled,
            filled_quantity: quantity,
            filled_price: fill_price,
        };

        info!(
            order_id = ack.order_id,
            ticker = ticket.ticker,
            side = %ticket.side,
            quantity = ticket.quantity,
            price = %fill_price,
            audit_tag = ticket.audit_tag,
            "Paper fill simulated"
        );

        Ok(ack)
    }

    fn name(&self) -> &str {
        "paper"
    }
}
