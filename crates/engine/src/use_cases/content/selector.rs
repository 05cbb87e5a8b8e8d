//! Question selection for the modes that do not play an authored quiz.
//!
//! Daily content is seeded from the date so every node picks the same ten
//! questions. Party and duel draws take a seed from the injected random source.

use std::sync::Arc;

use quizsprint_domain::content::{Difficulty, Question, QuestionFilter};
use quizsprint_domain::modes::daily::QUESTIONS_PER_DAY;
use quizsprint_domain::{CategoryId, GameDate};

use super::ContentError;
use crate::infrastructure::ports::QuestionRepo;

pub struct QuestionSelector {
    questions: Arc<dyn QuestionRepo>,
}

impl QuestionSelector {
    pub fn new(questions: Arc<dyn QuestionRepo>) -> Self {
        Self { questions }
    }

    /// The ten questions for `date`.
    ///
    /// Prefers a whole authored quiz of exactly ten questions; falls back to
    /// drawing from the full pool with the same seed.
    pub async fn daily_questions(&self, date: GameDate) -> Result<Vec<Question>, ContentError> {
        let seed = date.seed();
        let picked = self
            .questions
            .find_questions_by_quiz_seed(QUESTIONS_PER_DAY, seed)
            .await?;
        if picked.len() == QUESTIONS_PER_DAY {
            return Ok(picked);
        }

        tracing::debug!(%date, seed, "No ten-question quiz, drawing daily questions from the pool");
        self.draw(&QuestionFilter::new(), QUESTIONS_PER_DAY, seed).await
    }

    /// Exactly `count` questions matching `filter`.
    pub async fn draw(
        &self,
        filter: &QuestionFilter,
        count: usize,
        seed: i64,
    ) -> Result<Vec<Question>, ContentError> {
        let picked = self.questions.find_questions_by_seed(filter, count, seed).await?;
        if picked.len() < count {
            return Err(ContentError::NotEnoughQuestions {
                needed: count,
                found: picked.len(),
            });
        }
        Ok(picked)
    }

    /// Draw across several categories, alternating between them.
    ///
    /// An empty category list draws from the whole pool.
    pub async fn draw_from_categories(
        &self,
        categories: &[CategoryId],
        difficulty: Option<Difficulty>,
        count: usize,
        seed: i64,
    ) -> Result<Vec<Question>, ContentError> {
        let base = match difficulty {
            Some(d) => QuestionFilter::new().with_difficulty(d),
            None => QuestionFilter::new(),
        };
        if categories.is_empty() {
            return self.draw(&base, count, seed).await;
        }

        let mut pools = Vec::with_capacity(categories.len());
        for category_id in categories {
            let filter = base.clone().with_category(*category_id);
            let pool = self.questions.find_questions_by_seed(&filter, count, seed).await?;
            pools.push(pool.into_iter());
        }

        let mut picked = Vec::with_capacity(count);
        while picked.len() < count {
            let before = picked.len();
            for pool in pools.iter_mut() {
                if picked.len() == count {
                    break;
                }
                if let Some(q) = pool.next() {
                    picked.push(q);
                }
            }
            if picked.len() == before {
                break;
            }
        }

        if picked.len() < count {
            return Err(ContentError::NotEnoughQuestions {
                needed: count,
                found: picked.len(),
            });
        }
        Ok(picked)
    }
}
