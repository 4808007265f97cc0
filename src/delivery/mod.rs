pub mod machine;

pub use machine::{
    DeliveryPhase, DeliverySession, StudentIdentity, SubmitTrigger, TickOutcome,
};

use crate::config::DeliveryConfig;

/// Recurring one-shot timer driving `DeliverySession::tick`. Independent
/// of any in-flight submit; the machine's own guards keep a re-firing
/// timer from issuing a second submit.
pub fn tick_interval(config: &DeliveryConfig) -> tokio::time::Interval {
    tokio::time::interval(std::time::Duration::from_secs(
        config.tick_interval_seconds.max(1),
    ))
}
