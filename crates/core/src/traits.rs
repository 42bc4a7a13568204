use crate::account::AccountSnapshot;
use crate::events::{OrderAck, OrderTicket};
use crate::signal::CyclePlan;
use anyhow::Result;
use async_trait::async_trait;

/// Boundary to the external brokerage.
///
/// Implementations must raise on failure — never return a silent empty
/// success — so callers can fail closed.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn get_account_info(&self) -> Result<AccountSnapshot>;
    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderAck>;
    fn name(&self) -> &str;
}

/// Source of per-cycle upstream decisions. `Ok(None)` ends the service loop.
#[async_trait]
pub trait TargetProvider: Send + Sync {
    async fn next_plan(&mut self) -> Result<Option<CyclePlan>>;
}
