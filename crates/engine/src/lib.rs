pub mod breaker;
pub mod dispatch;
pub mod fills;
pub mod rebalance;
pub mod service;
pub mod stops;
pub mod types;

pub use breaker::{BreakerTripped, DrawdownBreaker};
pub use dispatch::OrderDispatcher;
pub use fills::{check_fill, FillVerdict};
pub use rebalance::{calculate_rebalance_orders, RebalanceOrder};
pub use service::BridgeService;
pub use stops::{compute_smart_stop, stop_distance_pct};
pub use types::{CycleReport, DispatchOutcome, DispatchStatus, SkipReason};
