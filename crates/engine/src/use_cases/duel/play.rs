//! Playing a duel: answers, disconnects and reconnects.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::content::Question;
use quizsprint_domain::events::DuelAnswerOutcome;
use quizsprint_domain::modes::duel::DuelGame;
use quizsprint_domain::rating::{EloRating, GameResult, Mmr, PlayerRating, RatingChange};
use quizsprint_domain::{AnswerId, DomainError, DuelGameId, EventSource, QuestionId, UserId};

use super::{current_question, load_game, DuelError, SeasonalRatings};
use crate::infrastructure::ports::{ClockPort, DuelGameRepo, EventBus, OnlineTracker, PlayerRatingRepo, QuestionRepo};
use crate::use_cases::publish;
use crate::use_cases::referral::UpdateReferralProgress;

#[derive(Debug, Clone)]
pub struct DuelAnswerInput {
    pub game_id: DuelGameId,
    pub player_id: UserId,
    /// Question the client believes is open
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub time_taken_ms: u32,
}

/// How one player's rating moved when the duel finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelRatingUpdate {
    pub player_id: UserId,
    pub change: RatingChange,
}

#[derive(Debug, Clone)]
pub struct DuelAnswerResult {
    pub outcome: DuelAnswerOutcome,
    /// Opened when this answer completed the round
    pub next_question: Option<Question>,
    /// Both players' rating changes, once the duel is over
    pub rating_updates: Vec<DuelRatingUpdate>,
}

pub struct SubmitDuelAnswer {
    games: Arc<dyn DuelGameRepo>,
    questions: Arc<dyn QuestionRepo>,
    ratings: Arc<dyn PlayerRatingRepo>,
    seasonal: Arc<SeasonalRatings>,
    presence: Arc<dyn OnlineTracker>,
    referrals: Arc<UpdateReferralProgress>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl SubmitDuelAnswer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        games: Arc<dyn DuelGameRepo>,
        questions: Arc<dyn QuestionRepo>,
        ratings: Arc<dyn PlayerRatingRepo>,
        seasonal: Arc<SeasonalRatings>,
        presence: Arc<dyn OnlineTracker>,
        referrals: Arc<UpdateReferralProgress>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            games,
            questions,
            ratings,
            seasonal,
            presence,
            referrals,
            events,
            clock,
        }
    }

    pub async fn execute(&self, input: DuelAnswerInput) -> Result<DuelAnswerResult, DuelError> {
        let mut game = load_game(self.games.as_ref(), input.game_id).await?;
        if game.current_question_id() != Some(input.question_id) {
            return Err(DomainError::QuestionNotInQuiz(input.question_id).into());
        }
        let question = self
            .questions
            .get(input.question_id)
            .await?
            .ok_or(DomainError::QuestionNotFound(input.question_id))?;

        // Snapshots taken when the duel was created; the finish overwrites them.
        let entry_mmr = (game.player1().elo().rating(), game.player2().elo().rating());

        let now = self.clock.now();
        let outcome = game.submit_answer(input.player_id, input.answer_id, input.time_taken_ms, &question, now)?;

        // Ratings are written before the finished duel so a failed write
        // leaves the last answer open for a retry.
        let mut rating_updates = Vec::new();
        if outcome.is_game_finished {
            rating_updates = self.settle(&mut game, entry_mmr, now).await?;
        }

        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        tracing::debug!(
            game_id = %game.id(),
            player_id = %input.player_id,
            round = outcome.round_number,
            correct = outcome.is_correct,
            points = outcome.points_earned,
            "Duel answer recorded"
        );

        let mut next_question = None;
        if outcome.is_game_finished {
            self.release_players(&game, &rating_updates).await;
        } else if outcome.both_answered {
            next_question = current_question(self.questions.as_ref(), &game).await?;
        }

        Ok(DuelAnswerResult {
            outcome,
            next_question,
            rating_updates,
        })
    }

    /// Rate both players, all or nothing.
    ///
    /// Both results are computed before either is written. If the second
    /// write fails the first player's previous rating is put back.
    async fn settle(
        &self,
        game: &mut DuelGame,
        entry_mmr: (Mmr, Mmr),
        now: DateTime<Utc>,
    ) -> Result<Vec<DuelRatingUpdate>, DuelError> {
        let seats = [
            (game.player1().user_id(), entry_mmr.1),
            (game.player2().user_id(), entry_mmr.0),
        ];

        let mut settled: Vec<(PlayerRating, PlayerRating, RatingChange)> = Vec::with_capacity(seats.len());
        for (player_id, opponent_mmr) in seats {
            let outcome = game
                .outcome_for(player_id)
                .ok_or(DomainError::GameNotActive)?;
            let before = self.seasonal.load_current(player_id, now).await?;
            let mut after = before.clone();
            let change = after.apply_game_result(GameResult {
                outcome,
                opponent_mmr,
                played_at: now,
            });
            settled.push((before, after, change));
        }

        for (i, (_, after, _)) in settled.iter().enumerate() {
            if let Err(e) = self.ratings.save(after).await {
                for (before, _, _) in &settled[..i] {
                    if let Err(restore) = self.ratings.save(before).await {
                        tracing::error!(
                            player_id = %before.player_id(),
                            error = %restore,
                            "Failed to restore rating after aborted settlement"
                        );
                    }
                }
                tracing::warn!(game_id = %game.id(), error = %e, "Duel settlement aborted");
                return Err(e.into());
            }
        }

        let snapshot = |rating: &PlayerRating| EloRating::new(rating.mmr(), rating.games_played());
        game.record_settled_ratings(snapshot(&settled[0].1), snapshot(&settled[1].1))?;

        let mut updates = Vec::with_capacity(settled.len());
        for (_, mut after, change) in settled {
            publish(self.events.as_ref(), after.take_events()).await;
            updates.push(DuelRatingUpdate {
                player_id: after.player_id(),
                change,
            });
        }
        Ok(updates)
    }

    /// Free both players and feed referral progress. Failures here are
    /// logged; the duel and both ratings are already stored.
    async fn release_players(&self, game: &DuelGame, updates: &[DuelRatingUpdate]) {
        for update in updates {
            let player_id = update.player_id;
            self.presence.set_in_match(player_id, None).await;

            let duels_played = match self.games.count_finished_by_player(player_id).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(%player_id, error = %e, "Failed to count finished duels");
                    continue;
                }
            };
            if let Err(e) = self
                .referrals
                .execute(player_id, duels_played, update.change.new_rank.league)
                .await
            {
                tracing::warn!(%player_id, error = %e, "Failed to update referral progress");
            }
        }

        tracing::info!(
            game_id = %game.id(),
            winner = ?game.winner_id(),
            player1_delta = updates.first().map(|u| u.change.delta()),
            player2_delta = updates.get(1).map(|u| u.change.delta()),
            "Duel finished"
        );
    }
}

pub struct DisconnectFromDuel {
    games: Arc<dyn DuelGameRepo>,
    presence: Arc<dyn OnlineTracker>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl DisconnectFromDuel {
    pub fn new(
        games: Arc<dyn DuelGameRepo>,
        presence: Arc<dyn OnlineTracker>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            games,
            presence,
            events,
            clock,
        }
    }

    /// When the second player drops the duel is abandoned: it is saved and
    /// `BothPlayersDisconnected` is still returned.
    pub async fn execute(&self, game_id: DuelGameId, player_id: UserId) -> Result<DuelGame, DuelError> {
        let mut game = load_game(self.games.as_ref(), game_id).await?;
        let abandoned = match game.handle_disconnect(player_id, self.clock.now()) {
            Ok(()) => false,
            Err(DomainError::BothPlayersDisconnected) => true,
            Err(e) => return Err(e.into()),
        };

        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        if abandoned {
            for id in [game.player1().user_id(), game.player2().user_id()] {
                self.presence.set_in_match(id, None).await;
            }
            tracing::info!(%game_id, "Duel abandoned");
            return Err(DomainError::BothPlayersDisconnected.into());
        }
        tracing::info!(%game_id, %player_id, "Duel player disconnected");
        Ok(game)
    }
}

pub struct ReconnectToDuel {
    games: Arc<dyn DuelGameRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl ReconnectToDuel {
    pub fn new(games: Arc<dyn DuelGameRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self { games, events, clock }
    }

    pub async fn execute(&self, game_id: DuelGameId, player_id: UserId) -> Result<DuelGame, DuelError> {
        let mut game = load_game(self.games.as_ref(), game_id).await?;
        game.handle_reconnect(player_id, self.clock.now())?;

        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        tracing::info!(%game_id, %player_id, "Duel player reconnected");
        Ok(game)
    }
}
