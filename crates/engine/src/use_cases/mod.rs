//! Use cases - player action orchestration.
//!
//! Each module holds the use cases for one game mode. A use case loads the
//! aggregates it needs through the ports, calls into the domain, saves, then
//! drains and publishes the aggregate events.

pub mod classic;
pub mod content;
pub mod daily;
pub mod duel;
pub mod party;
pub mod referral;

pub use classic::ClassicUseCases;
pub use content::ContentUseCases;
pub use daily::DailyUseCases;
pub use duel::DuelUseCases;
pub use party::PartyUseCases;
pub use referral::ReferralUseCases;

use quizsprint_domain::DomainEvent;

use crate::infrastructure::ports::EventBus;

/// Default page size for leaderboards.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest page a leaderboard query may ask for.
pub const MAX_LIMIT: usize = 100;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Publish events after a successful save. Failures are logged, never returned.
pub(crate) async fn publish(bus: &dyn EventBus, events: Vec<DomainEvent>) {
    if events.is_empty() {
        return;
    }
    let count = events.len();
    if let Err(e) = bus.publish(events).await {
        tracing::warn!(error = %e, count, "Failed to publish domain events");
    }
}
