//! Order wire types shared between the engine and broker backends.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Audit tag for orders whose signal was inferred through a derived
/// relationship rather than observed directly.
pub const AUDIT_TAG_PROPAGATED: &str = "signal:propagated";

/// Audit tag for orders originating from a directly observed decision.
pub const AUDIT_TAG_DIRECT: &str = "signal:direct";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit { price: Decimal },
}

/// A fully sized order request handed to a broker backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTicket {
    pub ticker: String,
    pub quantity: i64,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Protective stop attached by the risk policy.
    pub stop_price: Option<Decimal>,
    /// Provenance tag; one of [`AUDIT_TAG_PROPAGATED`] / [`AUDIT_TAG_DIRECT`].
    pub audit_tag: String,
}

/// Broker acknowledgement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Accepted,
    Filled,
    PartiallyFilled,
    Rejected,
}

/// Broker response to a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub filled_price: Decimal,
}
