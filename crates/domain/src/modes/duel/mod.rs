//! Quick duel: ranked 1v1 games, friend challenges and referrals

mod challenge;
mod game;
mod referral;

pub use challenge::{
    ChallengeKind, ChallengeStatus, DuelChallenge, DIRECT_CHALLENGE_TTL_SECS,
    LINK_CHALLENGE_TTL_SECS, PUSH_CHALLENGE_TTL_SECS,
};
pub use game::{
    speed_bonus, DuelGame, DuelPlayer, DuelStatus, RoundAnswer, BASE_POINTS_CORRECT,
    MIN_ANSWER_TIME_MS, QUESTIONS_PER_DUEL, SECONDS_PER_QUESTION,
};
pub use referral::{
    Referral, ReferralMilestone, ReferralReward, ReferralSide, DUELS_FOR_MILESTONE,
};
