//! Registry snapshot and restore with BLAKE3 hashing.
//!
//! Provides [`RegistrySnapshot`] -- a serializable copy of everything that
//! determines the registry's future behaviour (state, config, clock, nonce,
//! contract owner, kill flag) with a BLAKE3 content hash for integrity
//! verification and determinism testing.
//!
//! # Usage
//!
//! ```
//! use zombie_engine::prelude::*;
//!
//! let alice = Account::derive("alice");
//! let mut registry = ZombieRegistry::new(Account::derive("deployer"));
//! registry.create_random_zombie(alice, "Zombie 1").unwrap();
//!
//! let snapshot = registry.capture_snapshot();
//! assert_eq!(snapshot.hash.len(), 64); // BLAKE3 hex digest
//!
//! registry.advance_time(86_400);
//! registry.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(registry.now(), Timestamp::EPOCH);
//! assert_eq!(registry.state_hash(), snapshot.hash);
//! ```
//!
//! # What Is NOT Serialized
//!
//! - **Event journal** -- reset to empty on restore. Events describe how the
//!   state was reached, not the state itself.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use zombie_core::prelude::*;

use crate::registry::ZombieRegistry;

// ---------------------------------------------------------------------------
// RegistrySnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of a [`ZombieRegistry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Zombie records and ownership tables.
    pub state: RegistryState,
    /// Configuration the registry runs with.
    pub config: RegistryConfig,
    /// Contract owner.
    pub contract_owner: Account,
    /// Simulated clock.
    pub clock: Timestamp,
    /// Successful-call counter feeding the per-call generator.
    pub nonce: u64,
    /// Whether the registry was killed.
    pub destroyed: bool,
    /// BLAKE3 hex digest (64 lowercase hex chars) of all fields above.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HashableState<'a> {
    state: &'a RegistryState,
    config: &'a RegistryConfig,
    contract_owner: Account,
    clock: Timestamp,
    nonce: u64,
    destroyed: bool,
}

/// Compute the BLAKE3 hex digest of the hashable registry state.
///
/// All maps in the state are ordered, so the JSON byte stream (and the hash)
/// is stable across runs.
fn compute_hash(hashable: &HashableState<'_>) -> String {
    let json_bytes = serde_json::to_vec(hashable)
        .expect("registry state should always be JSON-serializable");
    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// ZombieRegistry snapshot/restore methods
// ---------------------------------------------------------------------------

impl ZombieRegistry {
    fn hashable(&self) -> HashableState<'_> {
        HashableState {
            state: &self.state,
            config: &self.config,
            contract_owner: self.contract_owner,
            clock: self.clock,
            nonce: self.nonce,
            destroyed: self.destroyed,
        }
    }

    /// Capture a complete snapshot of the registry.
    pub fn capture_snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            state: self.state.clone(),
            config: self.config.clone(),
            contract_owner: self.contract_owner,
            clock: self.clock,
            nonce: self.nonce,
            destroyed: self.destroyed,
            hash: self.state_hash(),
        }
    }

    /// Compute the BLAKE3 state hash without building a full snapshot.
    pub fn state_hash(&self) -> String {
        compute_hash(&self.hashable())
    }

    /// Build a registry from a snapshot.
    ///
    /// # Errors
    ///
    /// See [`restore_from_snapshot`](Self::restore_from_snapshot).
    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> anyhow::Result<Self> {
        verify(snapshot)?;
        Ok(Self::assemble(
            snapshot.state.clone(),
            snapshot.config.clone(),
            snapshot.contract_owner,
            snapshot.clock,
            snapshot.nonce,
            snapshot.destroyed,
        ))
    }

    /// Restore this registry to a previously captured snapshot.
    ///
    /// The snapshot is fully verified before anything is touched: the hash
    /// is recomputed, the configuration validated, and the state checked
    /// for structural integrity. On error the registry is unchanged.
    ///
    /// The event journal is reset.
    pub fn restore_from_snapshot(&mut self, snapshot: &RegistrySnapshot) -> anyhow::Result<()> {
        *self = Self::from_snapshot(snapshot)?;
        tracing::info!(hash = %snapshot.hash, zombies = self.zombie_count(), "registry restored");
        Ok(())
    }
}

fn verify(snapshot: &RegistrySnapshot) -> anyhow::Result<()> {
    let expected_hash = compute_hash(&HashableState {
        state: &snapshot.state,
        config: &snapshot.config,
        contract_owner: snapshot.contract_owner,
        clock: snapshot.clock,
        nonce: snapshot.nonce,
        destroyed: snapshot.destroyed,
    });
    if expected_hash != snapshot.hash {
        anyhow::bail!(
            "snapshot hash mismatch: recorded {} but recomputed {}. \
             The snapshot may be corrupted or tampered with.",
            snapshot.hash,
            expected_hash
        );
    }
    snapshot
        .config
        .validate()
        .context("snapshot carries an invalid config")?;
    snapshot
        .state
        .check_integrity()
        .context("snapshot state is inconsistent")?;
    Ok(())
}
