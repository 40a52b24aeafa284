//! Deterministic replay of recorded calls with per-call hash verification.
//!
//! A [`CallRecorder`] wraps a live [`ZombieRegistry`]: every [`Call`] it
//! executes is stored together with the result it produced and the state
//! hash right after it. [`replay`] restores the initial snapshot on a fresh
//! registry, re-executes the calls in order, and stops at the first call
//! whose result or resulting hash differs.
//!
//! # Recording and replaying
//!
//! ```
//! use zombie_engine::prelude::*;
//! use zombie_engine::replay::{replay, Call, CallRecorder};
//!
//! let alice = Account::derive("alice");
//! let registry = ZombieRegistry::new(Account::derive("deployer"));
//! let mut recorder = CallRecorder::new(registry);
//!
//! recorder.execute(Call::CreateRandomZombie { caller: alice, name: "Zombie 1".into() });
//! recorder.execute(Call::AdvanceTime { secs: 86_400 });
//!
//! let (_registry, log) = recorder.finish();
//! let result = replay(&log).expect("snapshot is valid");
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use serde::{Deserialize, Serialize};

use zombie_core::prelude::*;

use crate::registry::ZombieRegistry;
use crate::snapshot::RegistrySnapshot;
use crate::RegistryError;

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// One externally issued call, with everything needed to re-issue it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Call {
    CreateRandomZombie {
        caller: Account,
        name: String,
    },
    Approve {
        caller: Account,
        approved: Account,
        id: ZombieId,
    },
    TransferFrom {
        caller: Account,
        from: Account,
        to: Account,
        id: ZombieId,
    },
    Attack {
        caller: Account,
        attacker: ZombieId,
        defender: ZombieId,
    },
    ChangeName {
        caller: Account,
        id: ZombieId,
        name: String,
    },
    ChangeDna {
        caller: Account,
        id: ZombieId,
        dna: u64,
    },
    TransferOwnership {
        caller: Account,
        new_owner: Account,
    },
    Kill {
        caller: Account,
    },
    /// Not a call from an account: the execution context's clock moving.
    AdvanceTime {
        secs: u64,
    },
}

impl ZombieRegistry {
    /// Dispatch a [`Call`] and return the events it emitted.
    pub fn execute(&mut self, call: &Call) -> Result<Vec<DomainEvent>, RegistryError> {
        match call {
            Call::CreateRandomZombie { caller, name } => self
                .create_random_zombie(*caller, name)
                .map(|r| r.events),
            Call::Approve {
                caller,
                approved,
                id,
            } => self.approve(*caller, *approved, *id).map(|r| r.events),
            Call::TransferFrom {
                caller,
                from,
                to,
                id,
            } => self
                .transfer_from(*caller, *from, *to, *id)
                .map(|r| r.events),
            Call::Attack {
                caller,
                attacker,
                defender,
            } => self.attack(*caller, *attacker, *defender).map(|r| r.events),
            Call::ChangeName { caller, id, name } => {
                self.change_name(*caller, *id, name).map(|r| r.events)
            }
            Call::ChangeDna { caller, id, dna } => {
                self.change_dna(*caller, *id, *dna).map(|r| r.events)
            }
            Call::TransferOwnership { caller, new_owner } => self
                .transfer_ownership(*caller, *new_owner)
                .map(|r| r.events),
            Call::Kill { caller } => self.kill(*caller).map(|()| Vec::new()),
            Call::AdvanceTime { secs } => {
                self.advance_time(*secs);
                Ok(Vec::new())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CallLog
// ---------------------------------------------------------------------------

/// How a recorded call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallResult {
    /// The call succeeded and emitted this many events.
    Succeeded { events: usize },
    /// The call was rejected with this reason literal.
    Rejected { reason: String },
}

impl CallResult {
    fn of(result: &Result<Vec<DomainEvent>, RegistryError>) -> Self {
        match result {
            Ok(events) => CallResult::Succeeded {
                events: events.len(),
            },
            Err(err) => CallResult::Rejected {
                reason: err.reason().to_owned(),
            },
        }
    }
}

/// A recorded call with its observed result and post-call state hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEntry {
    pub call: Call,
    pub result: CallResult,
    /// BLAKE3 hex digest of the registry state after the call.
    pub state_hash: String,
}

/// A complete recording: initial snapshot plus every call in order.
///
/// Fully serializable to JSON for storage or regression fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    pub initial_snapshot: RegistrySnapshot,
    pub entries: Vec<CallEntry>,
}

// ---------------------------------------------------------------------------
// CallRecorder
// ---------------------------------------------------------------------------

/// Executes calls against a registry while recording them.
pub struct CallRecorder {
    registry: ZombieRegistry,
    log: CallLog,
}

impl CallRecorder {
    /// Start recording from the registry's current state.
    pub fn new(registry: ZombieRegistry) -> Self {
        let initial_snapshot = registry.capture_snapshot();
        Self {
            registry,
            log: CallLog {
                initial_snapshot,
                entries: Vec::new(),
            },
        }
    }

    /// Execute `call`, record it, and return its result.
    pub fn execute(&mut self, call: Call) -> Result<Vec<DomainEvent>, RegistryError> {
        let result = self.registry.execute(&call);
        self.log.entries.push(CallEntry {
            call,
            result: CallResult::of(&result),
            state_hash: self.registry.state_hash(),
        });
        result
    }

    /// The registry being recorded.
    pub fn registry(&self) -> &ZombieRegistry {
        &self.registry
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        self.log.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.log.entries.is_empty()
    }

    /// Stop recording, returning the registry and the log.
    pub fn finish(self) -> (ZombieRegistry, CallLog) {
        (self.registry, self.log)
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Details about the first call that replayed differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    /// Position of the call in the log.
    pub index: usize,
    pub expected_result: CallResult,
    pub actual_result: CallResult,
    pub expected_hash: String,
    pub actual_hash: String,
}

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// `false` if replay stopped at a divergence.
    pub completed: bool,
    /// Number of calls re-executed.
    pub calls_replayed: usize,
    /// `None` if every call reproduced its recorded result and hash.
    pub first_divergence: Option<ReplayDivergence>,
}

/// Re-execute `log` from its initial snapshot on a fresh registry.
///
/// Stops at the first call whose result or post-call hash differs from the
/// recording; `completed` is `false` in that case and `calls_replayed`
/// includes the diverging call.
///
/// # Errors
///
/// Fails if the initial snapshot does not verify.
pub fn replay(log: &CallLog) -> anyhow::Result<ReplayResult> {
    let mut registry = ZombieRegistry::from_snapshot(&log.initial_snapshot)?;

    for (index, entry) in log.entries.iter().enumerate() {
        let actual_result = CallResult::of(&registry.execute(&entry.call));
        let actual_hash = registry.state_hash();

        if actual_result != entry.result || actual_hash != entry.state_hash {
            tracing::warn!(index, expected = %entry.state_hash, actual = %actual_hash, "replay diverged");
            return Ok(ReplayResult {
                completed: false,
                calls_replayed: index + 1,
                first_divergence: Some(ReplayDivergence {
                    index,
                    expected_result: entry.result.clone(),
                    actual_result,
                    expected_hash: entry.state_hash.clone(),
                    actual_hash,
                }),
            });
        }
    }

    Ok(ReplayResult {
        completed: true,
        calls_replayed: log.entries.len(),
        first_divergence: None,
    })
}
