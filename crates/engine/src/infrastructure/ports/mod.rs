//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Aggregate storage (in-memory today, swappable for a database)
//! - Shared state (matchmaking queue, presence)
//! - Event delivery
//! - Clock/Random (for testing)

mod error;
mod repos;
mod services;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Shared-State Ports
// =============================================================================
pub use services::{EventBus, MatchmakingQueue, OnlineTracker};

#[cfg(test)]
pub use services::{MockEventBus, MockMatchmakingQueue, MockOnlineTracker};

pub use types::{Presence, QueuedPlayer, RatingStanding, Season};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{EventBusError, RepoError};
