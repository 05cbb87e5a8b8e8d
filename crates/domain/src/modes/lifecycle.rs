//! Status transition tables shared by game and room aggregates

use std::fmt::Debug;

use crate::error::DomainError;

/// A status enum with an explicit allowed-transitions table.
///
/// Aggregates change status only through [`Lifecycle::transition`], so every
/// status change is checked against the same table.
pub trait Lifecycle: Copy + Eq + Debug {
    /// Entry in the allowed-transitions table.
    fn can_transition_to(&self, next: Self) -> bool;

    /// Statuses from which no transition is allowed.
    fn is_terminal(&self) -> bool;

    /// Validate and return the next status.
    fn transition(self, next: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_state_transition(format!(
                "{:?} -> {:?}",
                self, next
            )))
        }
    }
}
