//! Core logic: link classification, alert throttling, and the monitor loop.
//!
//! - [`LinkStateMachine`]: classifies samples and reports state edges
//! - [`NotificationThrottle`]: suppresses repeat alerts for an unchanged speed
//! - [`MonitorLoop`]: per-tick orchestration and the cancellable poll schedule

pub mod link_state;
pub mod monitor;
pub mod throttle;

pub use link_state::{classify, Classification, LinkState, LinkStateMachine};
pub use monitor::{MonitorLoop, TickOutcome, TickReport};
pub use throttle::{NotificationThrottle, ThrottleState};
