//! Unified error types for the domain layer
//!
//! Every failure a caller may need to tell apart has its own variant. Variants are
//! grouped by [`ErrorKind`], which is what transport adapters map onto responses.
//! Errors are deterministic: the same state and inputs always produce the same error.

use thiserror::Error;

use crate::ids::{AnswerId, QuestionId, UserId};
use crate::value_objects::GameDate;

/// Coarse classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed IDs, out-of-range scalars, empty or overlong text
    Validation,
    /// Entity does not exist for the given id, date or key
    NotFound,
    /// Duplicate action (already answered, already in room, already claimed)
    Conflict,
    /// Operation not allowed in the current state of the aggregate
    Precondition,
    /// Timing validation rejected the submission
    AntiCheat,
    /// Aggregate reached a terminal state
    Terminal,
}

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // =========================================================================
    // Validation
    // =========================================================================
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format or zero ID where a real one is required
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    // =========================================================================
    // Not found
    // =========================================================================
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),

    #[error("Answer not found: {0}")]
    AnswerNotFound(AnswerId),

    #[error("Question {0} is not part of this quiz")]
    QuestionNotInQuiz(QuestionId),

    #[error("Player not found: {0}")]
    PlayerNotFound(UserId),

    #[error("Player {0} is not in this game")]
    PlayerNotInGame(UserId),

    // =========================================================================
    // Conflict
    // =========================================================================
    #[error("Question already answered: {0}")]
    AlreadyAnswered(QuestionId),

    #[error("Player {0} already answered this question")]
    PlayerAlreadyAnswered(UserId),

    #[error("Player {0} is already in the room")]
    PlayerAlreadyInRoom(UserId),

    #[error("Daily challenge already played on {0}")]
    AlreadyPlayedToday(GameDate),

    #[error("Player is already in the matchmaking queue")]
    AlreadyInQueue,

    #[error("Player is already in an active game")]
    AlreadyInGame,

    #[error("Player already has a referrer")]
    AlreadyReferred,

    #[error("Reward already claimed for milestone {0}")]
    RewardAlreadyClaimed(String),

    // =========================================================================
    // Preconditions
    // =========================================================================
    #[error("Quiz cannot be started: {0}")]
    CannotStartQuiz(String),

    #[error("Not enough players: {actual}/{required}")]
    NotEnoughPlayers { required: usize, actual: usize },

    #[error("Not all players are ready")]
    NotAllPlayersReady,

    #[error("Only the host can perform this action")]
    OnlyHostAllowed,

    #[error("The host cannot be removed by another player")]
    CannotKickHost,

    #[error("Room is full: {max} players")]
    RoomFull { max: usize },

    #[error("Room has already started")]
    RoomAlreadyStarted,

    #[error("Challenge is not pending")]
    ChallengeNotPending,

    #[error("Challenge has expired")]
    ChallengeExpired,

    #[error("Player is not the challenged player")]
    NotChallengedPlayer,

    #[error("Cannot challenge yourself")]
    CannotChallengeSelf,

    #[error("Player {0} is busy in another game")]
    FriendBusy(UserId),

    #[error("Cannot refer yourself")]
    SelfReferral,

    #[error("Milestone not reached: {0}")]
    MilestoneNotReached(String),

    #[error("Daily quiz has expired")]
    DailyQuizExpired,

    #[error("Retry limit reached: {max} attempts per day")]
    RetryLimitReached { max: u32 },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // =========================================================================
    // Anti-cheat
    // =========================================================================
    #[error("Answer submitted too fast: {time_taken_ms}ms (minimum {min_ms}ms)")]
    AnswerTooFast { time_taken_ms: u32, min_ms: u32 },

    // =========================================================================
    // Terminal
    // =========================================================================
    #[error("Session already finished")]
    SessionFinished,

    #[error("Game already finished")]
    GameFinished,

    #[error("Game is not active")]
    GameNotActive,

    #[error("Both players disconnected")]
    BothPlayersDisconnected,

    #[error("Room is closed")]
    RoomClosed,
}

impl DomainError {
    /// Creates a validation error for malformed input.
    ///
    /// Use this when a value cannot be accepted at construction time:
    /// - Text is empty or too long
    /// - Numbers are outside their allowed range
    ///
    /// # Example
    /// ```ignore
    /// if title.is_empty() {
    ///     return Err(DomainError::validation("Quiz title cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a cannot-start error with the reason the quiz refused
    pub fn cannot_start(reason: impl Into<String>) -> Self {
        Self::CannotStartQuiz(reason.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Classify this error for callers that only care about the family.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidId(_) | Self::Parse(_) => ErrorKind::Validation,

            Self::NotFound { .. }
            | Self::QuestionNotFound(_)
            | Self::AnswerNotFound(_)
            | Self::QuestionNotInQuiz(_)
            | Self::PlayerNotFound(_)
            | Self::PlayerNotInGame(_) => ErrorKind::NotFound,

            Self::AlreadyAnswered(_)
            | Self::PlayerAlreadyAnswered(_)
            | Self::PlayerAlreadyInRoom(_)
            | Self::AlreadyPlayedToday(_)
            | Self::AlreadyInQueue
            | Self::AlreadyInGame
            | Self::AlreadyReferred
            | Self::RewardAlreadyClaimed(_) => ErrorKind::Conflict,

            Self::CannotStartQuiz(_)
            | Self::NotEnoughPlayers { .. }
            | Self::NotAllPlayersReady
            | Self::OnlyHostAllowed
            | Self::CannotKickHost
            | Self::RoomFull { .. }
            | Self::RoomAlreadyStarted
            | Self::ChallengeNotPending
            | Self::ChallengeExpired
            | Self::NotChallengedPlayer
            | Self::CannotChallengeSelf
            | Self::FriendBusy(_)
            | Self::SelfReferral
            | Self::MilestoneNotReached(_)
            | Self::DailyQuizExpired
            | Self::RetryLimitReached { .. }
            | Self::InvalidStateTransition(_) => ErrorKind::Precondition,

            Self::AnswerTooFast { .. } => ErrorKind::AntiCheat,

            Self::SessionFinished
            | Self::GameFinished
            | Self::GameNotActive
            | Self::BothPlayersDisconnected
            | Self::RoomClosed => ErrorKind::Terminal,
        }
    }
}
