//! Classic mode use cases.
//!
//! A classic run plays one authored quiz. Streak multipliers raise the score
//! and the player's personal best on that quiz is shown as a ghost.

use std::sync::Arc;

use quizsprint_domain::modes::classic::PersonalBest;
use quizsprint_domain::{ClassicGameId, DomainError, QuizId, UserId};

use crate::infrastructure::ports::{PersonalBestRepo, RepoError};

mod sessions;
mod start;
mod submit;

pub use sessions::{AbandonClassic, ActiveRun, ActiveRunSummary, GetActiveClassic, ListActiveClassic};
pub use start::{ClassicStarted, StartClassic};
pub use submit::{ClassicAnswerInput, ClassicAnswerResult, SubmitClassicAnswer};

/// Container for classic use cases.
pub struct ClassicUseCases {
    pub start: Arc<StartClassic>,
    pub submit_answer: Arc<SubmitClassicAnswer>,
    pub personal_best: Arc<GetPersonalBest>,
    pub active_run: Arc<GetActiveClassic>,
    pub active_runs: Arc<ListActiveClassic>,
    pub abandon: Arc<AbandonClassic>,
}

impl ClassicUseCases {
    pub fn new(
        start: Arc<StartClassic>,
        submit_answer: Arc<SubmitClassicAnswer>,
        personal_best: Arc<GetPersonalBest>,
        active_run: Arc<GetActiveClassic>,
        active_runs: Arc<ListActiveClassic>,
        abandon: Arc<AbandonClassic>,
    ) -> Self {
        Self {
            start,
            submit_answer,
            personal_best,
            active_run,
            active_runs,
            abandon,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassicError {
    #[error("Quiz not found: {0}")]
    QuizNotFound(QuizId),
    /// Also returned when the game belongs to another player
    #[error("Classic game not found: {0}")]
    GameNotFound(ClassicGameId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct GetPersonalBest {
    personal_bests: Arc<dyn PersonalBestRepo>,
}

impl GetPersonalBest {
    pub fn new(personal_bests: Arc<dyn PersonalBestRepo>) -> Self {
        Self { personal_bests }
    }

    pub async fn execute(
        &self,
        player_id: UserId,
        quiz_id: QuizId,
    ) -> Result<Option<PersonalBest>, ClassicError> {
        Ok(self.personal_bests.get(player_id, quiz_id).await?)
    }
}
