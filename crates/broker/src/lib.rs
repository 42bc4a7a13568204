pub mod account;
pub mod live;
pub mod mock;
pub mod paper;

use std::sync::Arc;

use exec_bridge_core::{BrokerBackend, BrokerClient, BrokerConfig};

pub use account::AccountSnapshotCache;
pub use live::LiveBroker;
pub use mock::MockBroker;
pub use paper::PaperBroker;

/// Builds the broker backend selected by configuration.
///
/// Backend choice is a startup decision; nothing downstream inspects the
/// concrete type again.
#[must_use]
pub fn build_broker(config: &BrokerConfig) -> Arc<dyn BrokerClient> {
    match config.backend {
        BrokerBackend::Mock => Arc::new(MockBroker::default()),
        BrokerBackend::Paper => Arc::new(PaperBroker::new(config.paper_starting_cash)),
        BrokerBackend::Live => Arc::new(LiveBroker::new(config.base_url.clone())),
    }
}
