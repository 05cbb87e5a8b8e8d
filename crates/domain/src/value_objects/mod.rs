//! Value objects - Immutable objects defined by their attributes

mod game_date;
mod scoring;
mod tag;
mod text;

pub use game_date::GameDate;
pub use scoring::{
    PassingScore, Points, TimeLimit, MAX_PASSING_SCORE, MAX_POINTS, MAX_TIME_LIMIT_SECS,
};
pub use tag::{Tag, TAG_CATEGORIES};
pub use text::{AnswerText, CategoryName, QuestionText, QuizTitle};
