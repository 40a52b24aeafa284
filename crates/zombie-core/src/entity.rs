//! Zombie identifiers, genomes, and the zombie record itself.
//!
//! A [`ZombieId`] is a plain sequential `u64`. Ids are handed out in
//! allocation order starting at zero and are never recycled: there is no
//! burn operation, so the id of a zombie is also its index in the
//! [`EntityStore`](crate::store::EntityStore).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::{Account, Timestamp};

// ---------------------------------------------------------------------------
// ZombieId
// ---------------------------------------------------------------------------

/// A unique, immutable zombie identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZombieId(pub u64);

impl ZombieId {
    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Position of this zombie in the store, or `None` if the id does not
    /// fit in `usize` on this target.
    #[inline]
    pub(crate) fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Debug for ZombieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZombieId({})", self.0)
    }
}

impl fmt::Display for ZombieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Dna
// ---------------------------------------------------------------------------

/// Number of decimal digits in a genome.
pub const DNA_DIGITS: u32 = 16;

/// Every genome is reduced modulo this value.
pub const DNA_MODULUS: u64 = 10u64.pow(DNA_DIGITS);

/// A fixed-width (16 decimal digit) pseudo-random genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dna(u64);

impl Dna {
    /// Build a genome from an arbitrary value, truncating to 16 digits.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw % DNA_MODULUS)
    }

    /// Derive a genome from a name and one random draw.
    ///
    /// `blake3(name || draw_le)`, first 8 bytes little-endian, mod 10^16.
    /// The same `(name, draw)` pair always yields the same genome.
    pub fn derive(name: &str, draw: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(name.as_bytes());
        hasher.update(&draw.to_le_bytes());
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        Self::from_raw(u64::from_le_bytes(head))
    }

    /// The numeric genome value (always `< 10^16`).
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CombatState
// ---------------------------------------------------------------------------

/// Whether a zombie may currently start an attack.
///
/// This is never stored: it is derived from `ready_time` and the current
/// time on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    /// `now >= ready_time`.
    Ready,
    /// `now < ready_time`.
    Cooling,
}

// ---------------------------------------------------------------------------
// Zombie
// ---------------------------------------------------------------------------

/// A single zombie record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zombie {
    /// Immutable identifier, equal to the zombie's store index.
    pub id: ZombieId,
    /// Display name, never empty.
    pub name: String,
    /// Genome.
    pub dna: Dna,
    /// Starts at 1 and only grows through combat victories.
    pub level: u32,
    /// Before this instant the zombie cannot attack. Never decreases.
    pub ready_time: Timestamp,
    /// Attacks won.
    pub win_count: u32,
    /// Attacks lost.
    pub loss_count: u32,
    /// The account that minted this zombie. Used by the creation quota.
    pub creator: Account,
}

impl Zombie {
    /// Returns `true` if the cooldown has elapsed at `now`.
    #[inline]
    pub fn is_ready(&self, now: Timestamp) -> bool {
        now >= self.ready_time
    }

    /// The combat state at `now`.
    pub fn combat_state(&self, now: Timestamp) -> CombatState {
        if self.is_ready(now) {
            CombatState::Ready
        } else {
            CombatState::Cooling
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
