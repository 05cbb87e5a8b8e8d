//! Per-quiz leaderboard rows and the cross-quiz standings built from them

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{QuizId, SessionId, UserId};

/// One finished run on a quiz, as shown on its leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub session_id: SessionId,
    pub quiz_id: QuizId,
    pub user_id: UserId,
    pub username: String,
    pub score: u32,
    pub rank: u32,
    pub completed_at: DateTime<Utc>,
}

/// Assign 1-based ranks to entries sorted by score (descending), then by
/// completion time. Equal scores share a rank.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.completed_at.cmp(&b.completed_at))
    });
    let mut previous: Option<(u32, u32)> = None;
    for (index, entry) in entries.iter_mut().enumerate() {
        let rank = match previous {
            Some((score, rank)) if score == entry.score => rank,
            _ => index as u32 + 1,
        };
        entry.rank = rank;
        previous = Some((entry.score, rank));
    }
}

/// A player's standing across all quizzes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    /// Sum of the player's best score on each quiz
    pub total_score: u32,
    pub quizzes_completed: u32,
    pub rank: u32,
    pub last_activity_at: DateTime<Utc>,
}

/// Fold per-quiz runs into ranked global standings.
///
/// Only the best run per player and quiz counts. Higher totals rank first;
/// equal totals share a rank and are ordered by who got there first.
pub fn global_standings(entries: &[LeaderboardEntry]) -> Vec<GlobalLeaderboardEntry> {
    let mut best: HashMap<(UserId, QuizId), u32> = HashMap::new();
    let mut players: HashMap<UserId, GlobalLeaderboardEntry> = HashMap::new();

    for entry in entries {
        let slot = best.entry((entry.user_id, entry.quiz_id)).or_insert(0);
        *slot = (*slot).max(entry.score);

        let player = players.entry(entry.user_id).or_insert_with(|| GlobalLeaderboardEntry {
            user_id: entry.user_id,
            username: entry.username.clone(),
            total_score: 0,
            quizzes_completed: 0,
            rank: 0,
            last_activity_at: entry.completed_at,
        });
        if entry.completed_at >= player.last_activity_at {
            player.last_activity_at = entry.completed_at;
            player.username = entry.username.clone();
        }
    }
    for ((user_id, _), score) in best {
        if let Some(player) = players.get_mut(&user_id) {
            player.total_score += score;
            player.quizzes_completed += 1;
        }
    }

    let mut standings: Vec<GlobalLeaderboardEntry> = players.into_values().collect();
    standings.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.last_activity_at.cmp(&b.last_activity_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    let mut previous: Option<(u32, u32)> = None;
    for (index, player) in standings.iter_mut().enumerate() {
        let rank = match previous {
            Some((total, rank)) if total == player.total_score => rank,
            _ => index as u32 + 1,
        };
        player.rank = rank;
        previous = Some((player.total_score, rank));
    }
    standings
}
