//! Per-combatant state machine.

use telluria_data::CombatState;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEvent {
    EnterCombat,
    FleeAttempt,
    FleeFailed,
    Escaped,
    HpDepleted,
    CombatEnded,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("invalid combat transition from {from:?} on {event:?}")]
    InvalidTransition { from: CombatState, event: CombatEvent },
    #[error("unknown combatant {0}")]
    UnknownCombatant(uuid::Uuid),
}

/// The only legal moves. `Defeated` is terminal and rejects everything.
pub fn transition(from: CombatState, event: CombatEvent) -> Result<CombatState, CombatError> {
    use CombatEvent::*;
    use CombatState::*;
    match (from, event) {
        (Idle, EnterCombat) => Ok(InCombat),
        (InCombat, FleeAttempt) => Ok(Fleeing),
        (Fleeing, FleeFailed) => Ok(InCombat),
        (Fleeing, Escaped) => Ok(Idle),
        (InCombat, HpDepleted) => Ok(Defeated),
        (InCombat, CombatEnded) => Ok(Idle),
        _ => Err(CombatError::InvalidTransition { from, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_through_the_machine() {
        let s = transition(CombatState::Idle, CombatEvent::EnterCombat).unwrap();
        assert_eq!(s, CombatState::InCombat);
        let s = transition(s, CombatEvent::FleeAttempt).unwrap();
        assert_eq!(s, CombatState::Fleeing);
        let s = transition(s, CombatEvent::FleeFailed).unwrap();
        assert_eq!(s, CombatState::InCombat);
        let s = transition(s, CombatEvent::CombatEnded).unwrap();
        assert_eq!(s, CombatState::Idle);
    }

    #[test]
    fn defeated_is_terminal() {
        let s = transition(CombatState::InCombat, CombatEvent::HpDepleted).unwrap();
        assert_eq!(s, CombatState::Defeated);
        for event in [
            CombatEvent::EnterCombat,
            CombatEvent::FleeAttempt,
            CombatEvent::CombatEnded,
            CombatEvent::HpDepleted,
        ] {
            assert!(matches!(
                transition(CombatState::Defeated, event),
                Err(CombatError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn idle_cannot_flee() {
        assert!(transition(CombatState::Idle, CombatEvent::FleeAttempt).is_err());
    }
}
