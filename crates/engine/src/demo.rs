//! Demo content for a fresh in-memory engine.
//!
//! Generates an arithmetic pool and a capitals pool, plus one ten-question
//! quiz per category so the daily challenge has a quiz to draw from. The
//! same seed always produces the same questions.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use quizsprint_domain::content::{Answer, Category, Difficulty, Question, Quiz};
use quizsprint_domain::{
    AnswerText, CategoryId, CategoryName, DomainError, PassingScore, Points, QuestionText, QuizTitle, Tag, TimeLimit,
};

use crate::app::Repositories;
use crate::infrastructure::ports::RepoError;

const ARITHMETIC_QUESTIONS: usize = 40;
const QUIZ_LENGTH: usize = 10;

/// (country, capital)
const CAPITALS: &[(&str, &str)] = &[
    ("France", "Paris"),
    ("Japan", "Tokyo"),
    ("Canada", "Ottawa"),
    ("Australia", "Canberra"),
    ("Brazil", "Brasilia"),
    ("Kenya", "Nairobi"),
    ("Norway", "Oslo"),
    ("Egypt", "Cairo"),
    ("Peru", "Lima"),
    ("Vietnam", "Hanoi"),
    ("Poland", "Warsaw"),
    ("Chile", "Santiago"),
    ("Portugal", "Lisbon"),
    ("Morocco", "Rabat"),
    ("New Zealand", "Wellington"),
    ("Turkey", "Ankara"),
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// What `seed_demo_content` wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoContent {
    pub categories: usize,
    pub questions: usize,
    pub quizzes: usize,
}

pub async fn seed_demo_content(
    repositories: &Repositories,
    seed: u64,
    now: DateTime<Utc>,
) -> Result<DemoContent, SeedError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let arithmetic = Category::new(CategoryName::new("Arithmetic")?);
    let geography = Category::new(CategoryName::new("Geography")?);
    repositories.categories.save(&arithmetic).await?;
    repositories.categories.save(&geography).await?;

    let sums = (0..ARITHMETIC_QUESTIONS)
        .map(|i| arithmetic_question(&mut rng, arithmetic.id(), difficulty_for(i), now))
        .collect::<Result<Vec<_>, _>>()?;
    let capitals = CAPITALS
        .iter()
        .map(|&(country, capital)| capital_question(&mut rng, geography.id(), country, capital, now))
        .collect::<Result<Vec<_>, _>>()?;

    for question in sums.iter().chain(capitals.iter()).skip(QUIZ_LENGTH) {
        repositories.questions.save(question).await?;
    }

    let quizzes = [
        Quiz::new(QuizTitle::new("Mental Math")?, TimeLimit::new(20)?, PassingScore::new(60)?, now)
            .with_description("Ten quick sums, getting harder as you go")
            .with_category(arithmetic.id())
            .with_base_points(Points::new(100)?)
            .with_max_time_bonus(50)
            .with_streak_bonus(3, 25)
            .with_questions(sums[..QUIZ_LENGTH].to_vec())?
            .with_tags([Tag::new("topic:arithmetic")?, Tag::new("difficulty:mixed")?])?,
        Quiz::new(QuizTitle::new("World Capitals")?, TimeLimit::new(15)?, PassingScore::new(60)?, now)
            .with_description("Name the capital city")
            .with_category(geography.id())
            .with_base_points(Points::new(100)?)
            .with_max_time_bonus(50)
            .with_streak_bonus(3, 25)
            .with_questions(pick(&mut rng, &capitals, QUIZ_LENGTH))?
            .with_tags([Tag::new("topic:geography")?, Tag::new("format:multiple-choice")?])?,
    ];
    for quiz in &quizzes {
        repositories.quizzes.save(quiz).await?;
    }

    let content = DemoContent {
        categories: 2,
        questions: sums.len() + capitals.len(),
        quizzes: quizzes.len(),
    };
    tracing::info!(
        seed,
        categories = content.categories,
        questions = content.questions,
        quizzes = content.quizzes,
        "Demo content seeded"
    );
    Ok(content)
}

fn difficulty_for(index: usize) -> Difficulty {
    match index % 3 {
        0 => Difficulty::Easy,
        1 => Difficulty::Medium,
        _ => Difficulty::Hard,
    }
}

fn arithmetic_question(
    rng: &mut ChaCha8Rng,
    category_id: CategoryId,
    difficulty: Difficulty,
    now: DateTime<Utc>,
) -> Result<Question, DomainError> {
    let (text, answer, points) = match difficulty {
        Difficulty::Easy => {
            let (a, b) = (rng.gen_range(2..=20), rng.gen_range(2..=20));
            (format!("What is {a} + {b}?"), a + b, 100)
        }
        Difficulty::Medium => {
            let (a, b) = (rng.gen_range(3..=12), rng.gen_range(3..=12));
            (format!("What is {a} x {b}?"), a * b, 150)
        }
        Difficulty::Hard => {
            let (a, b) = (rng.gen_range(12..=25), rng.gen_range(11..=19));
            (format!("What is {a} x {b} - {b}?"), a * b - b, 200)
        }
    };

    let mut wrong: Vec<i32> = Vec::with_capacity(3);
    while wrong.len() < 3 {
        let candidate = answer + rng.gen_range(-10..=10);
        if candidate != answer && candidate > 0 && !wrong.contains(&candidate) {
            wrong.push(candidate);
        }
    }

    let mut answers = vec![Answer::new(AnswerText::new(answer.to_string())?, true)];
    for value in wrong {
        answers.push(Answer::new(AnswerText::new(value.to_string())?, false));
    }
    answers.shuffle(rng);

    Ok(Question::new(QuestionText::new(text)?, answers, Points::new(points)?)?
        .with_category(category_id)
        .with_difficulty(difficulty)
        .with_created_at(now))
}

fn capital_question(
    rng: &mut ChaCha8Rng,
    category_id: CategoryId,
    country: &str,
    capital: &str,
    now: DateTime<Utc>,
) -> Result<Question, DomainError> {
    let others: Vec<&str> = CAPITALS
        .iter()
        .map(|&(_, c)| c)
        .filter(|&c| c != capital)
        .collect();

    let mut answers = vec![Answer::new(AnswerText::new(capital)?, true)];
    for wrong in others.choose_multiple(rng, 3) {
        answers.push(Answer::new(AnswerText::new(*wrong)?, false));
    }
    answers.shuffle(rng);

    let difficulty = if country.len() > 6 { Difficulty::Medium } else { Difficulty::Easy };
    Ok(
        Question::new(QuestionText::new(format!("What is the capital of {country}?"))?, answers, Points::zero())?
            .with_category(category_id)
            .with_difficulty(difficulty)
            .with_created_at(now),
    )
}

fn pick(rng: &mut ChaCha8Rng, pool: &[Question], count: usize) -> Vec<Question> {
    pool.choose_multiple(rng, count).cloned().collect()
}
