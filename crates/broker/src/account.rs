//! Account snapshot cache — refreshed on demand, never on read.

use std::sync::Arc;

use exec_bridge_core::{AccountSnapshot, BrokerClient, PositionRecord};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Last known account state, wholesale-replaced on every [`refresh`].
///
/// Readers clone an `Arc` to an immutable snapshot, so no reader ever sees a
/// half-updated account. A failed fetch swaps in the conservative empty
/// snapshot: zero available funds, which blocks all downstream sizing.
///
/// [`refresh`]: AccountSnapshotCache::refresh
pub struct AccountSnapshotCache {
    broker: Arc<dyn BrokerClient>,
    snapshot: RwLock<Arc<AccountSnapshot>>,
}

impl AccountSnapshotCache {
    #[must_use]
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self {
            broker,
            snapshot: RwLock::new(Arc::new(AccountSnapshot::empty())),
        }
    }

    /// Fetches fresh account state from the broker and swaps it in.
    ///
    /// This is one of the two I/O points in the cycle. Fetch failures are
    /// not propagated: the cache fails closed to the empty snapshot.
    pub async fn refresh(&self) -> Arc<AccountSnapshot> {
        match self.broker.get_account_info().await {
            Ok(snap) => {
                let snap = Arc::new(snap);
                *self.snapshot.write() = Arc::clone(&snap);
                snap
            }
            Err(e) => {
                warn!(
                    broker = self.broker.name(),
                    error = %e,
                    "Account refresh failed, clearing snapshot"
                );
                let empty = Arc::new(AccountSnapshot::empty());
                *self.snapshot.write() = Arc::clone(&empty);
                empty
            }
        }
    }

    /// The cached snapshot. Never triggers I/O.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AccountSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    #[must_use]
    pub fn net_liquidation(&self) -> Decimal {
        self.snapshot.read().net_liquidation
    }

    #[must_use]
    pub fn available_funds(&self) -> Decimal {
        self.snapshot.read().available_funds
    }

    #[must_use]
    pub fn margin_utilization(&self) -> Option<Decimal> {
        self.snapshot.read().margin_utilization
    }

    #[must_use]
    pub fn positions(&self) -> Vec<PositionRecord> {
        self.snapshot.read().positions.clone()
    }

    /// Signed held quantity for `ticker` per the cached snapshot.
    #[must_use]
    pub fn position_quantity(&self, ticker: &str) -> Decimal {
        self.snapshot.read().position_quantity(ticker)
    }

    /// Emits a labeled NAV audit record. Side effect only.
    pub fn log_nav_snapshot(&self, label: &str, value: Decimal) {
        info!(label, nav = %value, "NAV snapshot");
    }
}
