pub mod account;
pub mod config;
pub mod config_loader;
pub mod events;
pub mod signal;
pub mod traits;

pub use account::{AccountSnapshot, PositionRecord};
pub use config::{
    BreakerConfig, BridgeConfig, BrokerBackend, BrokerConfig, RebalanceConfig, SizingConfig,
    StopConfig,
};
pub use config_loader::ConfigLoader;
pub use events::{
    OrderAck, OrderSide, OrderStatus, OrderTicket, OrderType, AUDIT_TAG_DIRECT,
    AUDIT_TAG_PROPAGATED,
};
pub use signal::{CyclePlan, LiveSignal, TargetWeights};
pub use traits::{BrokerClient, TargetProvider};
