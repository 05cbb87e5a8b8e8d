//! Shared gameplay kernel used by the single-player modes

pub mod session;

pub use session::{AnswerOutcome, AnswerRecord, GameplaySession};
