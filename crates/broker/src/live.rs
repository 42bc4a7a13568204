//! Live broker backend over a JSON/REST brokerage API.
//!
//! Every failure surfaces as an error: a non-success HTTP status, a
//! malformed payload, or a rejected order all raise, so the caller's
//! fail-closed handling is never bypassed by a silent empty success.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use exec_bridge_core::{
    AccountSnapshot, BrokerClient, OrderAck, OrderStatus, OrderTicket, OrderType, PositionRecord,
};
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct PositionWire {
    symbol: String,
    quantity: Decimal,
    average_cost: Decimal,
    #[serde(default)]
    market_value: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct AccountWire {
    net_liquidation: Decimal,
    available_funds: Decimal,
    #[serde(default)]
    margin_utilization: Option<Decimal>,
    #[serde(default)]
    positions: Vec<PositionWire>,
}

#[derive(Debug, Deserialize)]
struct OrderAckWire {
    order_id: String,
    status: String,
    #[serde(default)]
    filled_quantity: Decimal,
    #[serde(default)]
    filled_price: Decimal,
}

pub struct LiveBroker {
    http_client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl LiveBroker {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        // 600 requests per minute = 10 per second
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            http_client: Client::new(),
            base_url,
            rate_limiter,
        }
    }
}

#[async_trait]
impl BrokerClient for LiveBroker {
    async fn get_account_info(&self) -> Result<AccountSnapshot> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v1/account", self.base_url);
        let wire: AccountWire = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to reach account endpoint")?
            .error_for_status()
            .context("Account request returned an error status")?
            .json()
            .await
            .context("Malformed account payload")?;

        Ok(AccountSnapshot {
            net_liquidation: wire.net_liquidation,
            available_funds: wire.available_funds,
            margin_utilization: wire.margin_utilization,
            positions: wire
                .positions
                .into_iter()
                .map(|p| PositionRecord {
                    symbol: p.symbol,
                    quantity: p.quantity,
                    average_cost: p.average_cost,
                    market_value: p.market_value,
                })
                .collect(),
            fetched_at: Utc::now(),
        })
    }

    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderAck> {
        self.rate_limiter.until_ready().await;

        let (order_type, limit_price) = match &ticket.order_type {
            OrderType::Market => ("market", None),
            OrderType::Limit { price } => ("limit", Some(*price)),
        };

        let body = json!({
            "ticker": ticket.ticker,
            "quantity": ticket.quantity,
            "side": ticket.side.to_string(),
            "order_type": order_type,
            "limit_price": limit_price,
            "stop_price": ticket.stop_price,
            "audit_tag": ticket.audit_tag,
        });

        let url = format!("{}/v1/orders", self.base_url);
        let wire: OrderAckWire = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach order endpoint")?
            .error_for_status()
            .context("Order request returned an error status")?
            .json()
            .await
            .context("Malformed order acknowledgement")?;

        let status = match wire.status.as_str() {
            "accepted" => OrderStatus::Accepted,
            "filled" => OrderStatus::Filled,
            "partially_filled" => OrderStatus::PartiallyFilled,
            "rejected" => {
                anyhow::bail!("Order {} rejected by broker", wire.order_id)
            }
            other => anyhow::bail!("Unknown order status: {other}"),
        };

        info!(
            order_id = wire.order_id,
            ticker = ticket.ticker,
            side = %ticket.side,
            quantity = ticket.quantity,
            "Order submitted"
        );

        Ok(OrderAck {
            order_id: wire.order_id,
            status,
            filled_quantity: wire.filled_quantity,
            filled_price: wire.filled_price,
        })
    }

    fn name(&self) -> &str {
        "live"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exec_bridge_core::{OrderSide, AUDIT_TAG_DIRECT};
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ticket() -> OrderTicket {
        OrderTicket {
            ticker: "AAPL".to_string(),
            quantity: 10,
            side: OrderSide::Buy,
            order_type: OrderType::Limit { price: dec!(150) },
            stop_price: Some(dec!(145)),
            audit_tag: AUDIT_TAG_DIRECT.to_string(),
        }
    }

    #[tokio::test]
    async fn parses_account_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "net_liquidation": "100000",
                "available_funds": "40000",
                "margin_utilization": "0.25",
                "positions": [
                    {"symbol": "AAPL", "quantity": "100", "average_cost": "150"}
                ]
            })))
            .mount(&server)
            .await;

        let broker = LiveBroker::new(server.uri());
        let snap = broker.get_account_info().await.unwrap();

        assert_eq!(snap.net_liquidation, dec!(100000));
        assert_eq!(snap.available_funds, dec!(40000));
        assert_eq!(snap.margin_utilization, Some(dec!(0.25)));
        assert_eq!(snap.position_quantity("AAPL"), dec!(100));
    }

    #[tokio::test]
    async fn server_error_raises_instead_of_empty_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let broker = LiveBroker::new(server.uri());
        assert!(broker.get_account_info().await.is_err());
    }

    #[tokio::test]
    async fn accepted_order_maps_to_ack() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order_id": "LIVE-42",
                "status": "filled",
                "filled_quantity": "10",
                "filled_price": "149.90"
            })))
            .mount(&server)
            .await;

        let broker = LiveBroker::new(server.uri());
        let ack = broker.submit_order(&ticket()).await.unwrap();

        assert_eq!(ack.order_id, "LIVE-42");
        assert_eq!(ack.status, OrderStatus::Filled);
        assert_eq!(ack.filled_quantity, dec!(10));
    }

    #[tokio::test]
    async fn rejected_order_raises() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order_id": "LIVE-43",
                "status": "rejected"
            })))
            .mount(&server)
            .await;

        let broker = LiveBroker::new(server.uri());
        let err = broker.submit_order(&ticket()).await.unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }
}
