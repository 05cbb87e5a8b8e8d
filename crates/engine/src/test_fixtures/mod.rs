//! Builders shared by engine tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use quizsprint_domain::content::{Answer, Difficulty, Question, Quiz};
use quizsprint_domain::{AnswerId, AnswerText, CategoryId, PassingScore, Points, QuestionText, QuizTitle, TimeLimit};

use crate::app::App;
use crate::infrastructure::clock::{SeededRandom, SteppingClock};
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::RandomPort;

/// 2026-01-25 10:00 UTC
pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-25T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Question with one correct and two wrong answers.
pub fn question(points: u32) -> Question {
    Question::new(
        QuestionText::new("Which planet is known as the red planet?").unwrap(),
        vec![
            Answer::new(AnswerText::new("Mars").unwrap(), true),
            Answer::new(AnswerText::new("Venus").unwrap(), false),
            Answer::new(AnswerText::new("Jupiter").unwrap(), false),
        ],
        Points::new(points).unwrap(),
    )
    .unwrap()
}

pub fn categorized_question(category_id: CategoryId, difficulty: Difficulty) -> Question {
    question(100)
        .with_category(category_id)
        .with_difficulty(difficulty)
}

/// Quiz with `count` questions of `points` each and a passing score of zero.
pub fn quiz(count: usize, points: u32, time_limit_secs: u32, max_time_bonus: u32) -> Quiz {
    let mut quiz = Quiz::new(
        QuizTitle::new("Space trivia").unwrap(),
        TimeLimit::new(time_limit_secs).unwrap(),
        PassingScore::new(0).unwrap(),
        now(),
    )
    .with_max_time_bonus(max_time_bonus)
    .with_streak_bonus(3, 0);
    for _ in 0..count {
        quiz.add_question(question(points)).unwrap();
    }
    quiz
}

pub fn correct_id(question: &Question) -> AnswerId {
    question.correct_answer().unwrap().id()
}

pub fn wrong_id(question: &Question) -> AnswerId {
    question
        .answers()
        .iter()
        .find(|a| !a.is_correct())
        .unwrap()
        .id()
}

/// Random source that replays scripted values, then falls back to `min`.
pub struct ScriptedRandom {
    values: Mutex<VecDeque<i32>>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }
}

impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let next = self.values.lock().unwrap().pop_front();
        next.map_or(min, |v| v.clamp(min, max.max(min)))
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// In-memory app on a clock the test controls.
pub fn test_app() -> (App, Arc<SteppingClock>) {
    let clock = Arc::new(SteppingClock::new(now()));
    let app = App::in_memory(EngineConfig::default(), clock.clone(), Arc::new(SeededRandom::new(7)));
    (app, clock)
}
