//! Domain events and call receipts.
//!
//! Core operations never publish events through a side channel. Each
//! successful call returns a [`Receipt`] carrying its value plus the ordered
//! list of [`DomainEvent`]s it produced; the caller decides where they go
//! (usually an [`EventJournal`](crate::journal::EventJournal)).
//!
//! External consumers read event arguments positionally, so
//! [`DomainEvent::args`] fixes the argument order for every variant.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::account::Account;
use crate::entity::{Dna, ZombieId};

// ---------------------------------------------------------------------------
// CombatOutcome
// ---------------------------------------------------------------------------

/// Result of a resolved attack, from the attacker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory,
    Defeat,
}

impl CombatOutcome {
    /// Lowercase label used in event arguments and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            CombatOutcome::Victory => "victory",
            CombatOutcome::Defeat => "defeat",
        }
    }
}

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something observable that happened as the result of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A zombie was minted. Args: `(id, name, dna)`.
    Creation { id: ZombieId, name: String, dna: Dna },
    /// Ownership moved. Args: `(from, to, id)`.
    Transfer {
        from: Account,
        to: Account,
        id: ZombieId,
    },
    /// A transfer delegate was set. Args: `(owner, approved, id)`.
    Approval {
        owner: Account,
        approved: Account,
        id: ZombieId,
    },
    /// An attack was resolved. Args: `(attacker, defender, outcome)`.
    CombatResult {
        attacker: ZombieId,
        defender: ZombieId,
        outcome: CombatOutcome,
    },
    /// A zombie was renamed. Args: `(id, name)`.
    NameChanged { id: ZombieId, name: String },
    /// A zombie's genome was replaced. Args: `(id, dna)`.
    DnaChanged { id: ZombieId, dna: Dna },
    /// The registry's contract owner changed. Args: `(previous, new)`.
    OwnershipTransferred { previous: Account, new: Account },
}

/// Discriminant of a [`DomainEvent`], for journal queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Creation,
    Transfer,
    Approval,
    CombatResult,
    NameChanged,
    DnaChanged,
    OwnershipTransferred,
}

impl DomainEvent {
    /// The event's kind.
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::Creation { .. } => EventKind::Creation,
            DomainEvent::Transfer { .. } => EventKind::Transfer,
            DomainEvent::Approval { .. } => EventKind::Approval,
            DomainEvent::CombatResult { .. } => EventKind::CombatResult,
            DomainEvent::NameChanged { .. } => EventKind::NameChanged,
            DomainEvent::DnaChanged { .. } => EventKind::DnaChanged,
            DomainEvent::OwnershipTransferred { .. } => EventKind::OwnershipTransferred,
        }
    }

    /// Positional arguments, in the documented order for each variant.
    ///
    /// Ids and genomes are JSON numbers, accounts are hex strings, and combat
    /// outcomes are `"victory"` / `"defeat"`.
    pub fn args(&self) -> Vec<Value> {
        match self {
            DomainEvent::Creation { id, name, dna } => {
                vec![json!(id.0), json!(name), json!(dna.value())]
            }
            DomainEvent::Transfer { from, to, id } => {
                vec![json!(from.to_string()), json!(to.to_string()), json!(id.0)]
            }
            DomainEvent::Approval {
                owner,
                approved,
                id,
            } => vec![
                json!(owner.to_string()),
                json!(approved.to_string()),
                json!(id.0),
            ],
            DomainEvent::CombatResult {
                attacker,
                defender,
                outcome,
            } => vec![json!(attacker.0), json!(defender.0), json!(outcome.as_str())],
            DomainEvent::NameChanged { id, name } => vec![json!(id.0), json!(name)],
            DomainEvent::DnaChanged { id, dna } => vec![json!(id.0), json!(dna.value())],
            DomainEvent::OwnershipTransferred { previous, new } => {
                vec![json!(previous.to_string()), json!(new.to_string())]
            }
        }
    }

    /// Returns `true` if the event names `id` in any role.
    pub fn involves(&self, zombie: ZombieId) -> bool {
        match self {
            DomainEvent::Creation { id, .. }
            | DomainEvent::Transfer { id, .. }
            | DomainEvent::Approval { id, .. }
            | DomainEvent::NameChanged { id, .. }
            | DomainEvent::DnaChanged { id, .. } => *id == zombie,
            DomainEvent::CombatResult {
                attacker, defender, ..
            } => *attacker == zombie || *defender == zombie,
            DomainEvent::OwnershipTransferred { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// The output of a successful state-mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<T> {
    /// The call's return value.
    pub value: T,
    /// Events emitted by the call, in emission order.
    pub events: Vec<DomainEvent>,
}

impl<T> Receipt<T> {
    /// A receipt with a single event.
    pub fn new(value: T, event: DomainEvent) -> Self {
        Self {
            value,
            events: vec![event],
        }
    }

    /// Transform the value, keeping the events.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Receipt<U> {
        Receipt {
            value: f(self.value),
            events: self.events,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_args_are_id_then_name() {
        let event = DomainEvent::Creation {
            id: ZombieId(0),
            name: "Zombie 1".to_owned(),
            dna: Dna::from_raw(1234),
        };
        let args = event.args();
        assert_eq!(args[0], json!(0));
        assert_eq!(args[1], json!("Zombie 1"));
        assert_eq!(args[2], json!(1234));
        assert_eq!(event.kind(), EventKind::Creation);
    }

    #[test]
    fn transfer_args_are_from_to_id() {
        let alice = Account::derive("alice");
        let bob = Account::derive("bob");
        let event = DomainEvent::Transfer {
            from: alice,
            to: bob,
            id: ZombieId(4),
        };
        assert_eq!(
            event.args(),
            vec![json!(alice.to_string()), json!(bob.to_string()), json!(4)]
        );
    }

    #[test]
    fn combat_involves_both_sides() {
        let event = DomainEvent::CombatResult {
            attacker: ZombieId(1),
            defender: ZombieId(2),
            outcome: CombatOutcome::Defeat,
        };
        assert!(event.involves(ZombieId(1)));
        assert!(event.involves(ZombieId(2)));
        assert!(!event.involves(ZombieId(3)));
        assert_eq!(event.args()[2], json!("defeat"));
    }

    #[test]
    fn receipt_map_keeps_events() {
        let receipt = Receipt::new(
            1u8,
            DomainEvent::NameChanged {
                id: ZombieId(0),
                name: "x".to_owned(),
            },
        );
        let mapped = receipt.map(|v| v as u64 * 10);
        assert_eq!(mapped.value, 10);
        assert_eq!(mapped.events.len(), 1);
    }
}
