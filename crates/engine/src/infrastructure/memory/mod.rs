//! In-memory adapters for every port.
//!
//! Used by the binary and by tests. State lives behind `tokio::sync::RwLock`
//! or `DashMap`; nothing is persisted.

mod classic;
mod content;
mod daily;
mod duel;
mod event_bus;
mod matchmaking;
mod party;
mod presence;
pub mod selection;

pub use classic::{InMemoryClassicGames, InMemoryPersonalBests};
pub use content::{InMemoryContent, InMemoryLeaderboard, InMemorySessions};
pub use daily::{InMemoryDailyGames, InMemoryDailyQuizzes};
pub use duel::{InMemoryChallenges, InMemoryDuelGames, InMemoryRatings, InMemoryReferrals, InMemorySeasons};
pub use event_bus::InMemoryEventBus;
pub use matchmaking::InMemoryMatchmakingQueue;
pub use party::{InMemoryPartyGames, InMemoryPartyRooms};
pub use presence::InMemoryOnlineTracker;

use quizsprint_domain::EventSource;

/// Copy of an aggregate as it would come back from storage: pending events
/// are never persisted.
fn stored<T: Clone + EventSource>(aggregate: &T) -> T {
    let mut copy = aggregate.clone();
    copy.take_events();
    copy
}
