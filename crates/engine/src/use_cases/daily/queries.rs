//! Read-side daily queries, plus chest opening.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::modes::daily::{ChestReward, ChestType, DailyGame, MAX_ATTEMPTS_PER_DAY};
use quizsprint_domain::{DailyGameId, DomainError, EventSource, GameDate, UserId};

use super::{roll_chest, DailyError};
use crate::infrastructure::ports::{ClockPort, DailyGameRepo, EventBus, RandomPort};
use crate::use_cases::{clamp_limit, publish};

/// Where the player stands on today's challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStatusView {
    pub date: GameDate,
    pub has_played: bool,
    pub is_completed: bool,
    pub attempts: u32,
    pub can_retry: bool,
    pub game_id: Option<DailyGameId>,
    pub final_score: Option<u32>,
    pub rank: Option<u32>,
    pub chest_type: Option<ChestType>,
    pub current_streak: u32,
    /// When today's challenge closes
    pub resets_at: DateTime<Utc>,
}

pub struct GetDailyStatus {
    games: Arc<dyn DailyGameRepo>,
    clock: Arc<dyn ClockPort>,
}

impl GetDailyStatus {
    pub fn new(games: Arc<dyn DailyGameRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { games, clock }
    }

    pub async fn execute(&self, player_id: UserId) -> Result<DailyStatusView, DailyError> {
        let today = GameDate::from_datetime(self.clock.now());
        let attempts = self.games.find_by_player_and_date(player_id, today).await?;
        let latest = attempts.last();

        let current_streak = match latest {
            Some(game) => game.streak().effective_current(today),
            None => self
                .games
                .find_latest_by_player(player_id)
                .await?
                .map_or(0, |g| g.streak().effective_current(today)),
        };
        let completed = latest.filter(|g| g.is_completed());

        Ok(DailyStatusView {
            date: today,
            has_played: latest.is_some(),
            is_completed: completed.is_some(),
            attempts: attempts.len() as u32,
            can_retry: completed.is_some_and(|g| g.attempt() < MAX_ATTEMPTS_PER_DAY),
            game_id: latest.map(DailyGame::id),
            final_score: completed.map(DailyGame::final_score),
            rank: completed.and_then(DailyGame::rank),
            chest_type: completed.map(DailyGame::chest_type),
            current_streak,
            resets_at: today.start_of_next_day(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLeaderboardRow {
    pub rank: u32,
    pub player_id: UserId,
    pub final_score: u32,
    pub correct_answers: usize,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLeaderboard {
    pub date: GameDate,
    pub rows: Vec<DailyLeaderboardRow>,
    /// Requesting player's own rank, when they completed the day
    pub player_rank: Option<u32>,
}

pub struct GetDailyLeaderboard {
    games: Arc<dyn DailyGameRepo>,
    clock: Arc<dyn ClockPort>,
}

impl GetDailyLeaderboard {
    pub fn new(games: Arc<dyn DailyGameRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { games, clock }
    }

    /// Best completed attempt per player. `date` defaults to today.
    pub async fn execute(
        &self,
        date: Option<GameDate>,
        player_id: Option<UserId>,
        limit: Option<usize>,
    ) -> Result<DailyLeaderboard, DailyError> {
        let date = date.unwrap_or_else(|| GameDate::from_datetime(self.clock.now()));
        let top = self.games.top_by_date(date, clamp_limit(limit)).await?;

        let rows: Vec<DailyLeaderboardRow> = top
            .iter()
            .enumerate()
            .map(|(i, game)| DailyLeaderboardRow {
                rank: i as u32 + 1,
                player_id: game.player_id(),
                final_score: game.final_score(),
                correct_answers: game.correct_answers(),
                streak: game.streak().current(),
            })
            .collect();

        let player_rank = match player_id {
            None => None,
            Some(player_id) => match rows.iter().find(|r| r.player_id == player_id) {
                Some(row) => Some(row.rank),
                None => {
                    let best = self
                        .games
                        .find_by_player_and_date(player_id, date)
                        .await?
                        .iter()
                        .filter(|g| g.is_completed())
                        .map(DailyGame::final_score)
                        .max();
                    match best {
                        Some(score) => Some(self.games.rank_for_score(date, score).await?),
                        None => None,
                    }
                }
            },
        };

        Ok(DailyLeaderboard {
            date,
            rows,
            player_rank,
        })
    }
}

/// Streak summary for the profile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakView {
    pub current: u32,
    pub best: u32,
    pub last_played: Option<GameDate>,
    pub bonus_percent: u32,
    pub next_milestone: Option<u32>,
    pub days_to_next_milestone: Option<u32>,
    pub is_active: bool,
    pub can_restore: bool,
}

pub struct GetPlayerStreak {
    games: Arc<dyn DailyGameRepo>,
    clock: Arc<dyn ClockPort>,
}

impl GetPlayerStreak {
    pub fn new(games: Arc<dyn DailyGameRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { games, clock }
    }

    pub async fn execute(&self, player_id: UserId) -> Result<StreakView, DailyError> {
        let today = GameDate::from_datetime(self.clock.now());
        let streak = self
            .games
            .find_latest_by_player(player_id)
            .await?
            .map(|g| g.streak())
            .unwrap_or_default();

        let is_active = streak.is_active(today);
        Ok(StreakView {
            current: streak.effective_current(today),
            best: streak.best(),
            last_played: streak.last_played(),
            bonus_percent: if is_active { streak.bonus().extra_percent() } else { 0 },
            next_milestone: streak.next_milestone(),
            days_to_next_milestone: streak.days_to_next_milestone(),
            is_active,
            can_restore: streak.can_restore(today),
        })
    }
}

/// Open the chest of a completed daily game. Opening again returns the same
/// reward.
pub struct OpenChest {
    games: Arc<dyn DailyGameRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl OpenChest {
    pub fn new(
        games: Arc<dyn DailyGameRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            games,
            events,
            clock,
            random,
        }
    }

    pub async fn execute(&self, player_id: UserId, game_id: DailyGameId) -> Result<ChestReward, DailyError> {
        let mut game = self
            .games
            .get(game_id)
            .await?
            .filter(|g| g.player_id() == player_id)
            .ok_or(DailyError::GameNotFound(game_id))?;

        if let Some(reward) = game.chest_reward() {
            return Ok(reward.clone());
        }
        if !game.is_completed() {
            return Err(DomainError::GameNotActive.into());
        }

        let reward = roll_chest(&mut game, self.random.as_ref(), self.clock.now())?;
        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;
        tracing::info!(%game_id, %player_id, chest = %reward.chest_type, "Daily chest opened");
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{MockDailyGameRepo, MockEventBus};
    use crate::test_fixtures::{correct_id, now, quiz};
    use quizsprint_domain::modes::daily::DailyStreak;
    use quizsprint_domain::DailyQuizId;

    fn today() -> GameDate {
        GameDate::from_datetime(now())
    }

    fn completed_game(player_id: UserId, date: GameDate, correct: usize, streak: DailyStreak) -> DailyGame {
        let mut game = DailyGame::new(player_id, DailyQuizId::new(), date, quiz(10, 100, 15, 0), streak, now()).unwrap();
        let questions = game.session().quiz().questions().to_vec();
        for (i, q) in questions.iter().enumerate() {
            let answer = if i < correct {
                correct_id(q)
            } else {
                crate::test_fixtures::wrong_id(q)
            };
            game.answer_question(q.id(), answer, 3_000, now()).unwrap();
        }
        game.take_events();
        game
    }

    mod status {
        use super::*;

        #[tokio::test]
        async fn no_play_today_shows_carried_streak() {
            let player = UserId::new();
            let yesterday = completed_game(player, today().previous(), 6, DailyStreak::new());

            let mut games = MockDailyGameRepo::new();
            games
                .expect_find_by_player_and_date()
                .with(eq(player), eq(today()))
                .returning(|_, _| Ok(Vec::new()));
            games
                .expect_find_latest_by_player()
                .returning(move |_| Ok(Some(yesterday.clone())));

            let status = GetDailyStatus::new(Arc::new(games), Arc::new(FixedClock(now())))
                .execute(player)
                .await
                .unwrap();

            assert!(!status.has_played);
            assert!(!status.can_retry);
            assert_eq!(status.current_streak, 1);
            assert_eq!(status.resets_at, today().start_of_next_day());
        }

        #[tokio::test]
        async fn completed_first_attempt_can_retry() {
            let player = UserId::new();
            let game = completed_game(player, today(), 6, DailyStreak::new());
            let game_id = game.id();

            let mut games = MockDailyGameRepo::new();
            games
                .expect_find_by_player_and_date()
                .returning(move |_, _| Ok(vec![game.clone()]));

            let status = GetDailyStatus::new(Arc::new(games), Arc::new(FixedClock(now())))
                .execute(player)
                .await
                .unwrap();

            assert!(status.is_completed);
            assert!(status.can_retry);
            assert_eq!(status.game_id, Some(game_id));
            assert_eq!(status.final_score, Some(600));
            assert_eq!(status.chest_type, Some(ChestType::Silver));
        }
    }

    mod leaderboard {
        use super::*;

        #[tokio::test]
        async fn rows_are_ranked_and_limit_is_clamped() {
            let (a, b) = (UserId::new(), UserId::new());
            let rows = vec![
                completed_game(a, today(), 9, DailyStreak::new()),
                completed_game(b, today(), 7, DailyStreak::new()),
            ];

            let mut games = MockDailyGameRepo::new();
            games
                .expect_top_by_date()
                .with(eq(today()), eq(100))
                .returning(move |_, _| Ok(rows.clone()));

            let board = GetDailyLeaderboard::new(Arc::new(games), Arc::new(FixedClock(now())))
                .execute(None, Some(b), Some(1_000))
                .await
                .unwrap();

            assert_eq!(board.rows.len(), 2);
            assert_eq!((board.rows[0].rank, board.rows[0].player_id, board.rows[0].final_score), (1, a, 900));
            assert_eq!(board.player_rank, Some(2));
        }

        #[tokio::test]
        async fn player_outside_page_gets_computed_rank() {
            let (a, b) = (UserId::new(), UserId::new());
            let top = vec![completed_game(a, today(), 9, DailyStreak::new())];
            let mine = completed_game(b, today(), 2, DailyStreak::new());

            let mut games = MockDailyGameRepo::new();
            games.expect_top_by_date().returning(move |_, _| Ok(top.clone()));
            games
                .expect_find_by_player_and_date()
                .with(eq(b), eq(today()))
                .returning(move |_, _| Ok(vec![mine.clone()]));
            games
                .expect_rank_for_score()
                .with(eq(today()), eq(200))
                .returning(|_, _| Ok(37));

            let board = GetDailyLeaderboard::new(Arc::new(games), Arc::new(FixedClock(now())))
                .execute(Some(today()), Some(b), Some(1))
                .await
                .unwrap();
            assert_eq!(board.player_rank, Some(37));
        }
    }

    mod streak {
        use super::*;

        #[tokio::test]
        async fn missed_day_shows_zero_but_can_restore() {
            let player = UserId::new();
            let two_days_ago = today().previous().previous();
            let streak = DailyStreak::reconstruct(3, 9, Some(two_days_ago.previous()));
            let last_game = completed_game(player, two_days_ago, 10, streak);

            let mut games = MockDailyGameRepo::new();
            games
                .expect_find_latest_by_player()
                .returning(move |_| Ok(Some(last_game.clone())));

            let view = GetPlayerStreak::new(Arc::new(games), Arc::new(FixedClock(now())))
                .execute(player)
                .await
                .unwrap();

            assert_eq!(view.current, 0);
            assert_eq!(view.best, 9);
            assert!(!view.is_active);
            assert!(view.can_restore);
            assert_eq!(view.next_milestone, Some(7));
            assert_eq!(view.days_to_next_milestone, Some(3));
            assert_eq!(view.bonus_percent, 0);
        }

        #[tokio::test]
        async fn new_player_has_empty_streak() {
            let mut games = MockDailyGameRepo::new();
            games.expect_find_latest_by_player().returning(|_| Ok(None));

            let view = GetPlayerStreak::new(Arc::new(games), Arc::new(FixedClock(now())))
                .execute(UserId::new())
                .await
                .unwrap();
            assert_eq!(view.current, 0);
            assert_eq!(view.next_milestone, Some(3));
            assert!(!view.can_restore);
        }
    }

    mod chest {
        use super::*;

        #[tokio::test]
        async fn opening_twice_returns_the_same_reward() {
            let player = UserId::new();
            let game = completed_game(player, today(), 5, DailyStreak::new());
            let game_id = game.id();

            let mut games = MockDailyGameRepo::new();
            games.expect_get().with(eq(game_id)).times(1).returning(move |_| Ok(Some(game.clone())));
            games.expect_save().times(1).returning(|_| Ok(()));
            let mut bus = MockEventBus::new();
            bus.expect_publish().times(1).returning(|_| Ok(()));

            let open = OpenChest::new(Arc::new(games), Arc::new(bus), Arc::new(FixedClock(now())), Arc::new(FixedRandom(0)));
            let reward = open.execute(player, game_id).await.unwrap();
            assert_eq!(reward.chest_type, ChestType::Silver);
            assert_eq!(reward.coins, 150);
        }

        #[tokio::test]
        async fn stored_reward_is_not_rerolled() {
            let player = UserId::new();
            let mut game = completed_game(player, today(), 8, DailyStreak::new());
            roll_chest(&mut game, &FixedRandom(0), now()).unwrap();
            let stored = game.chest_reward().cloned().unwrap();
            let game_id = game.id();

            let mut games = MockDailyGameRepo::new();
            games.expect_get().returning(move |_| Ok(Some(game.clone())));
            games.expect_save().never();

            let open = OpenChest::new(
                Arc::new(games),
                Arc::new(MockEventBus::new()),
                Arc::new(FixedClock(now())),
                Arc::new(FixedRandom(100)),
            );
            assert_eq!(open.execute(player, game_id).await.unwrap(), stored);
        }

        #[tokio::test]
        async fn foreign_game_is_not_found() {
            let game = completed_game(UserId::new(), today(), 5, DailyStreak::new());
            let game_id = game.id();
            let mut games = MockDailyGameRepo::new();
            games.expect_get().returning(move |_| Ok(Some(game.clone())));

            let open = OpenChest::new(
                Arc::new(games),
                Arc::new(MockEventBus::new()),
                Arc::new(FixedClock(now())),
                Arc::new(FixedRandom(0)),
            );
            let err = open.execute(UserId::new(), game_id).await.unwrap_err();
            assert!(matches!(err, DailyError::GameNotFound(_)));
        }
    }
}
