//! QuizSprint Engine library.
//!
//! Game-mode orchestration for the QuizSprint quiz platform: classic runs,
//! the daily challenge, party rooms and ranked quick duels, plus ratings,
//! challenges and referrals.
//!
//! ## Structure
//!
//! - `use_cases/` - One module per game mode, orchestrating domain aggregates
//! - `infrastructure/` - Port traits, in-memory adapters, clock and config
//! - `app` - Application composition
//! - `demo` - Seeded demo content

pub mod app;
pub mod demo;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures shared by the engine's unit tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
