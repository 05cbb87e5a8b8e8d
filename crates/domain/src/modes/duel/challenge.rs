//! Friend challenges: direct invitations and shareable links

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{ChallengeEvent, DomainEvent, EventSource};
use crate::ids::{ChallengeId, DuelGameId, UserId};
use crate::modes::Lifecycle;

/// Direct challenge to an online friend
pub const DIRECT_CHALLENGE_TTL_SECS: i64 = 60;

/// Direct challenge once a push notification was delivered
pub const PUSH_CHALLENGE_TTL_SECS: i64 = 300;

pub const LINK_CHALLENGE_TTL_SECS: i64 = 86_400;

const LINK_PREFIX: &str = "t.me/quizsprintbot?start=duel_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl Lifecycle for ChallengeStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Declined) | (Self::Pending, Self::Expired)
        )
    }

    fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeKind {
    Direct,
    Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelChallenge {
    id: ChallengeId,
    challenger_id: UserId,
    /// Unknown for a link challenge until someone accepts it
    challenged_id: Option<UserId>,
    kind: ChallengeKind,
    status: ChallengeStatus,
    link: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
    match_id: Option<DuelGameId>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl DuelChallenge {
    pub fn direct(
        challenger_id: UserId,
        challenged_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if challenger_id.is_nil() || challenged_id.is_nil() {
            return Err(DomainError::invalid_id("challenge players must not be nil"));
        }
        if challenger_id == challenged_id {
            return Err(DomainError::CannotChallengeSelf);
        }
        Ok(Self::create(
            ChallengeId::new(),
            challenger_id,
            Some(challenged_id),
            ChallengeKind::Direct,
            None,
            created_at + Duration::seconds(DIRECT_CHALLENGE_TTL_SECS),
            created_at,
        ))
    }

    /// Shareable challenge; the link carries the first eight characters of the id.
    pub fn link(challenger_id: UserId, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if challenger_id.is_nil() {
            return Err(DomainError::invalid_id("challenger must not be nil"));
        }
        let id = ChallengeId::new();
        let short: String = id.to_string().chars().take(8).collect();
        Ok(Self::create(
            id,
            challenger_id,
            None,
            ChallengeKind::Link,
            Some(format!("{LINK_PREFIX}{short}")),
            created_at + Duration::seconds(LINK_CHALLENGE_TTL_SECS),
            created_at,
        ))
    }

    fn create(
        id: ChallengeId,
        challenger_id: UserId,
        challenged_id: Option<UserId>,
        kind: ChallengeKind,
        link: Option<String>,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut challenge = Self {
            id,
            challenger_id,
            challenged_id,
            kind,
            status: ChallengeStatus::Pending,
            link,
            expires_at,
            created_at,
            responded_at: None,
            match_id: None,
            events: Vec::new(),
        };
        challenge.events.push(
            ChallengeEvent::Created {
                challenge_id: id,
                challenger_id,
                challenged_id,
                kind,
                expires_at,
                occurred_at: created_at,
            }
            .into(),
        );
        challenge
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ChallengeId {
        self.id
    }

    #[inline]
    pub fn challenger_id(&self) -> UserId {
        self.challenger_id
    }

    #[inline]
    pub fn challenged_id(&self) -> Option<UserId> {
        self.challenged_id
    }

    #[inline]
    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    #[inline]
    pub fn status(&self) -> ChallengeStatus {
        self.status
    }

    pub fn link_url(&self) -> Option<&str> {
        self.link.as_deref()
    }

    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    #[inline]
    pub fn match_id(&self) -> Option<DuelGameId> {
        self.match_id
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChallengeStatus::Pending
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Does the link carry this short code?
    pub fn matches_code(&self, code: &str) -> bool {
        self.link
            .as_deref()
            .and_then(|l| l.strip_prefix(LINK_PREFIX))
            .is_some_and(|short| short.eq_ignore_ascii_case(code.trim()))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Keep a direct challenge open longer once the friend was notified by push.
    pub fn extend_for_push(&mut self) -> Result<(), DomainError> {
        if !self.is_pending() {
            return Err(DomainError::ChallengeNotPending);
        }
        if self.kind == ChallengeKind::Direct {
            self.expires_at = self.created_at + Duration::seconds(PUSH_CHALLENGE_TTL_SECS);
        }
        Ok(())
    }

    pub fn accept(&mut self, accepter_id: UserId, accepted_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_responder(accepter_id, accepted_at)?;
        if self.kind == ChallengeKind::Link {
            self.challenged_id = Some(accepter_id);
        }
        self.status = self.status.transition(ChallengeStatus::Accepted)?;
        self.responded_at = Some(accepted_at);

        self.events.push(
            ChallengeEvent::Accepted {
                challenge_id: self.id,
                challenger_id: self.challenger_id,
                accepter_id,
                occurred_at: accepted_at,
            }
            .into(),
        );
        Ok(())
    }

    pub fn decline(&mut self, decliner_id: UserId, declined_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_responder(decliner_id, declined_at)?;
        self.status = self.status.transition(ChallengeStatus::Declined)?;
        self.responded_at = Some(declined_at);

        self.events.push(
            ChallengeEvent::Declined {
                challenge_id: self.id,
                challenger_id: self.challenger_id,
                decliner_id,
                occurred_at: declined_at,
            }
            .into(),
        );
        Ok(())
    }

    /// Move a pending challenge past its deadline to Expired.
    pub fn expire(&mut self, expired_at: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_pending() {
            return Err(DomainError::ChallengeNotPending);
        }
        self.status = self.status.transition(ChallengeStatus::Expired)?;
        self.responded_at = Some(expired_at);

        self.events.push(
            ChallengeEvent::Expired {
                challenge_id: self.id,
                challenger_id: self.challenger_id,
                challenged_id: self.challenged_id,
                occurred_at: expired_at,
            }
            .into(),
        );
        Ok(())
    }

    pub fn attach_match(&mut self, match_id: DuelGameId) {
        self.match_id = Some(match_id);
    }

    /// Pending, not past the deadline (expiring it if so), and the right person.
    fn check_responder(&mut self, responder_id: UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_pending() {
            return Err(DomainError::ChallengeNotPending);
        }
        if self.is_expired(at) {
            self.expire(at)?;
            return Err(DomainError::ChallengeExpired);
        }
        match self.kind {
            ChallengeKind::Direct if self.challenged_id != Some(responder_id) => {
                Err(DomainError::NotChallengedPlayer)
            }
            ChallengeKind::Link if responder_id == self.challenger_id => Err(DomainError::CannotChallengeSelf),
            _ => Ok(()),
        }
    }
}

impl EventSource for DuelChallenge {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
