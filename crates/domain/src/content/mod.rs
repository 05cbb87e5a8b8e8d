//! Quiz content model: questions, quizzes, categories and selection filters
//!
//! Content is authored outside the engine. Game modes only read it.

pub mod filter;
pub mod leaderboard;
pub mod question;
pub mod quiz;

pub use filter::{Category, QuestionFilter, QuizFilter};
pub use leaderboard::{global_standings, rank_entries, GlobalLeaderboardEntry, LeaderboardEntry};
pub use question::{Answer, Difficulty, Question, MAX_ANSWERS, MIN_ANSWERS};
pub use quiz::{Quiz, MAX_QUESTIONS_PER_QUIZ, MAX_TAGS_PER_QUIZ};
