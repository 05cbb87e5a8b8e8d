//! Domain Events
//!
//! Coarse-grained events raised by aggregates when their state changes.
//! Aggregates buffer events internally; the application layer drains them
//! with [`EventSource::take_events`] after a successful save and hands them
//! to the event bus.
//!
//! ## Outcome Types
//!
//! The per-mode submodules also hold the value returned from each answer
//! submission, telling the caller what happened without re-reading state.

pub mod challenge_events;
pub mod classic_events;
pub mod daily_events;
pub mod duel_events;
pub mod party_events;
pub mod rating_events;
pub mod referral_events;

pub use challenge_events::*;
pub use classic_events::*;
pub use daily_events::*;
pub use duel_events::*;
pub use party_events::*;
pub use rating_events::*;
pub use referral_events::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain event for significant state changes, grouped by game mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "event", rename_all = "camelCase")]
pub enum DomainEvent {
    Classic(ClassicEvent),
    Daily(DailyEvent),
    Party(PartyEvent),
    Duel(DuelEvent),
    Rating(RatingEvent),
    Challenge(ChallengeEvent),
    Referral(ReferralEvent),
}

impl DomainEvent {
    /// Stable `mode.event_name` identifier, used for routing and logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Classic(e) => e.event_type(),
            Self::Daily(e) => e.event_type(),
            Self::Party(e) => e.event_type(),
            Self::Duel(e) => e.event_type(),
            Self::Rating(e) => e.event_type(),
            Self::Challenge(e) => e.event_type(),
            Self::Referral(e) => e.event_type(),
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Classic(e) => e.occurred_at(),
            Self::Daily(e) => e.occurred_at(),
            Self::Party(e) => e.occurred_at(),
            Self::Duel(e) => e.occurred_at(),
            Self::Rating(e) => e.occurred_at(),
            Self::Challenge(e) => e.occurred_at(),
            Self::Referral(e) => e.occurred_at(),
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for DomainEvent {
                fn from(event: $ty) -> Self {
                    Self::$variant(event)
                }
            }
        )+
    };
}

impl_from_event! {
    Classic => ClassicEvent,
    Daily => DailyEvent,
    Party => PartyEvent,
    Duel => DuelEvent,
    Rating => RatingEvent,
    Challenge => ChallengeEvent,
    Referral => ReferralEvent,
}

/// Implemented by aggregates that buffer domain events
pub trait EventSource {
    /// Drain buffered events, oldest first
    fn take_events(&mut self) -> Vec<DomainEvent>;
}
