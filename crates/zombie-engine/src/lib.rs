//! Zombie Engine -- execution context for the zombie registry.
//!
//! This crate builds on [`zombie_core`] to provide what the core deliberately
//! leaves out: a caller-facing registry with a simulated clock, a
//! deterministic per-call generator, a contract owner with a kill switch, an
//! event journal, blake3-hashed snapshots, and call-log replay.
//!
//! # Quick Start
//!
//! ```
//! use zombie_engine::prelude::*;
//!
//! let alice = Account::derive("alice");
//! let bob = Account::derive("bob");
//! let mut registry = ZombieRegistry::new(Account::derive("deployer"));
//!
//! let receipt = registry.create_random_zombie(alice, "Zombie 1").unwrap();
//! let id = receipt.value;
//! assert_eq!(receipt.events[0].args()[1], "Zombie 1");
//!
//! registry.transfer_from(alice, alice, bob, id).unwrap();
//! assert_eq!(registry.owner_of(id).unwrap(), bob);
//!
//! let err = registry.transfer_from(alice, alice, bob, id).unwrap_err();
//! assert_eq!(err.reason(), "permission denied");
//! ```

#![deny(unsafe_code)]

pub mod registry;
pub mod replay;
pub mod snapshot;

use zombie_core::account::Account;
use zombie_core::CoreError;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the core crate for convenience.
pub use zombie_core;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a registry call was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Rejected by the core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The registry has been killed.
    #[error("registry destroyed")]
    Destroyed,

    /// A contract-owner-only call came from someone else.
    #[error("caller is not the owner")]
    NotContractOwner { caller: Account },
}

impl RegistryError {
    /// Stable, human-readable reason literal.
    pub fn reason(&self) -> &'static str {
        match self {
            RegistryError::Core(err) => err.reason(),
            RegistryError::Destroyed => "registry destroyed",
            RegistryError::NotContractOwner { .. } => "caller is not the owner",
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the core prelude.
    pub use zombie_core::prelude::*;

    // Engine-specific exports.
    pub use crate::registry::ZombieRegistry;
    pub use crate::replay::{
        replay, Call, CallEntry, CallLog, CallRecorder, CallResult, ReplayDivergence,
        ReplayResult,
    };
    pub use crate::snapshot::RegistrySnapshot;
    pub use crate::RegistryError;
}
