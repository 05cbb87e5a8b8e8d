//! QuizSprint domain model
//!
//! Pure game rules with no I/O: the content model, the shared gameplay
//! kernel, the four game modes, the rating ladder and the events they raise.
//! Time and randomness are always passed in by the caller.

extern crate self as quizsprint_domain;

pub mod content;
pub mod error;
pub mod events;
pub mod ids;
pub mod kernel;
pub mod modes;
pub mod rating;
pub mod value_objects;

pub use error::{DomainError, ErrorKind};
pub use events::{DomainEvent, EventSource};

// Re-export ID types
pub use ids::{
    AnswerId, CategoryId, ChallengeId, ClassicGameId, DailyGameId, DailyQuizId, DuelGameId,
    PartyGameId, PartyRoomId, QuestionId, QuizId, ReferralId, SessionId, UserId,
};

// Re-export content types
pub use content::{
    Answer, Category, Difficulty, GlobalLeaderboardEntry, LeaderboardEntry, Question, QuestionFilter, Quiz,
    QuizFilter,
};

pub use kernel::{AnswerOutcome, AnswerRecord, GameplaySession};
pub use modes::Lifecycle;

pub use value_objects::{
    AnswerText, CategoryName, GameDate, PassingScore, Points, QuestionText, QuizTitle, Tag, TimeLimit,
};
