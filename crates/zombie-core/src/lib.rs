//! Zombie Core -- entity lifecycle and ownership state machine.
//!
//! This crate is the context-free core of the zombie registry. It mints
//! uniquely identified zombies bound to owner accounts, enforces
//! single-owner transfer and approval rules, and resolves cooldown-gated
//! attacks between zombies.
//!
//! Nothing in here reads a clock or a global generator. Every operation
//! receives a [`CallContext`](account::CallContext) (caller + current time)
//! and, where it needs randomness, an injected [`rand::RngCore`]. Every
//! successful mutation returns a [`Receipt`](event::Receipt) with the events
//! it emitted; every failure leaves the [`RegistryState`](state::RegistryState)
//! untouched.
//!
//! # Quick Start
//!
//! ```
//! use zombie_core::prelude::*;
//! # struct Draw(u64);
//! # impl rand::RngCore for Draw {
//! #     fn next_u32(&mut self) -> u32 { self.0 as u32 }
//! #     fn next_u64(&mut self) -> u64 { self.0 }
//! #     fn fill_bytes(&mut self, dest: &mut [u8]) { dest.fill(0) }
//! #     fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
//! #         dest.fill(0);
//! #         Ok(())
//! #     }
//! # }
//!
//! let config = RegistryConfig::default();
//! let mut state = RegistryState::new();
//! let alice = Account::derive("alice");
//! let ctx = CallContext::new(alice, Timestamp(0));
//!
//! let receipt = config
//!     .creation_service()
//!     .create(&mut state, &ctx, "Zombie 1", &mut Draw(7))
//!     .unwrap();
//! assert_eq!(receipt.value, ZombieId(0));
//! assert_eq!(state.owner_of(ZombieId(0)), Ok(alice));
//!
//! let err = config
//!     .creation_service()
//!     .create(&mut state, &ctx, "Zombie 2", &mut Draw(8))
//!     .unwrap_err();
//! assert_eq!(err.reason(), "max zombies exceeded");
//! ```

#![deny(unsafe_code)]

pub mod account;
pub mod combat;
pub mod config;
pub mod creation;
pub mod entity;
pub mod event;
pub mod helper;
pub mod journal;
pub mod ownership;
pub mod state;
pub mod store;

use account::{Account, Timestamp};
use entity::ZombieId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a core operation was rejected.
///
/// Each variant has a stable [`reason`](Self::reason) string that callers
/// may match on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The zombie id was never allocated.
    #[error("zombie not found: {id}")]
    NotFound { id: ZombieId },

    /// The `from` named in a transfer is not the current owner.
    #[error("invalid owner: {claimed} does not own {id}")]
    InvalidOwner { id: ZombieId, claimed: Account },

    /// The caller is neither the owner nor the approved delegate.
    #[error("permission denied")]
    Unauthorized { caller: Account, id: ZombieId },

    /// The caller already holds as many self-minted zombies as allowed.
    #[error("max zombies exceeded")]
    QuotaExceeded { account: Account, cap: usize },

    /// The attacker is still cooling down.
    #[error("zombie not ready: {id} is cooling down until {ready_at}")]
    NotReady { id: ZombieId, ready_at: Timestamp },

    /// Names must contain at least one non-whitespace character.
    #[error("invalid name: must not be empty")]
    InvalidName,

    /// A zombie cannot attack itself.
    #[error("invalid target: {id} cannot attack itself")]
    InvalidTarget { id: ZombieId },

    /// The zombie has not reached the level the operation requires.
    #[error("level too low: {id} is level {actual}, needs {required}")]
    LevelTooLow {
        id: ZombieId,
        required: u32,
        actual: u32,
    },
}

impl CoreError {
    /// Stable, human-readable reason literal.
    pub fn reason(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "zombie not found",
            CoreError::InvalidOwner { .. } => "invalid owner",
            CoreError::Unauthorized { .. } => "permission denied",
            CoreError::QuotaExceeded { .. } => "max zombies exceeded",
            CoreError::NotReady { .. } => "zombie not ready",
            CoreError::InvalidName => "invalid name",
            CoreError::InvalidTarget { .. } => "invalid target",
            CoreError::LevelTooLow { .. } => "level too low",
        }
    }
}

/// A structural invariant of [`RegistryState`](state::RegistryState) does
/// not hold. Only reachable through hand-built or corrupted snapshots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("zombie at index {index} carries id {id}")]
    IdMismatch { index: usize, id: ZombieId },

    #[error("zombie {id} has no owner")]
    Unowned { id: ZombieId },

    #[error("owner map references unknown zombie {id}")]
    UnknownOwned { id: ZombieId },

    #[error("owner index disagrees with owner map for {id}")]
    OwnerIndexMismatch { id: ZombieId },

    #[error("owner index holds an empty set for {account}")]
    EmptyHolding { account: Account },

    #[error("owner index lists {indexed} zombies but {owned} are owned")]
    HoldingCountMismatch { indexed: usize, owned: usize },

    #[error("approval recorded for unknown zombie {id}")]
    OrphanApproval { id: ZombieId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::account::{Account, CallContext, Timestamp};
    pub use crate::combat::{CombatEngine, VictoryPolicy};
    pub use crate::config::{ConfigError, RegistryConfig};
    pub use crate::creation::CreationService;
    pub use crate::entity::{CombatState, Dna, Zombie, ZombieId};
    pub use crate::event::{CombatOutcome, DomainEvent, EventKind, Receipt};
    pub use crate::helper::ZombieHelper;
    pub use crate::journal::{EventJournal, JournalEntry};
    pub use crate::ownership::OwnershipRegistry;
    pub use crate::state::RegistryState;
    pub use crate::store::EntityStore;
    pub use crate::{CoreError, IntegrityError};
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
