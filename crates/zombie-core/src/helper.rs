//! Level-gated edits to a zombie the caller owns.

use tracing::debug;

use crate::account::CallContext;
use crate::entity::{Dna, ZombieId};
use crate::event::{DomainEvent, Receipt};
use crate::state::RegistryState;
use crate::CoreError;

/// Renames and genome swaps, unlocked by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZombieHelper {
    /// Minimum level for [`change_name`](Self::change_name).
    pub rename_level: u32,
    /// Minimum level for [`change_dna`](Self::change_dna).
    pub dna_change_level: u32,
}

impl ZombieHelper {
    pub fn new(rename_level: u32, dna_change_level: u32) -> Self {
        Self {
            rename_level,
            dna_change_level,
        }
    }

    /// Rename `id`. Emits [`DomainEvent::NameChanged`].
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` (caller is not the owner), `LevelTooLow`,
    /// or `InvalidName` for an empty name.
    pub fn change_name(
        &self,
        state: &mut RegistryState,
        ctx: &CallContext,
        id: ZombieId,
        name: &str,
    ) -> Result<Receipt<()>, CoreError> {
        self.authorize(state, ctx, id, self.rename_level)?;
        if name.trim().is_empty() {
            return Err(CoreError::InvalidName);
        }

        state.store.set_name(id, name.to_owned())?;
        debug!(caller = %ctx.caller, %id, name, "zombie renamed");
        Ok(Receipt::new(
            (),
            DomainEvent::NameChanged {
                id,
                name: name.to_owned(),
            },
        ))
    }

    /// Replace the genome of `id`. The value is truncated to 16 digits.
    /// Emits [`DomainEvent::DnaChanged`].
    pub fn change_dna(
        &self,
        state: &mut RegistryState,
        ctx: &CallContext,
        id: ZombieId,
        raw_dna: u64,
    ) -> Result<Receipt<()>, CoreError> {
        self.authorize(state, ctx, id, self.dna_change_level)?;

        let dna = Dna::from_raw(raw_dna);
        state.store.set_dna(id, dna)?;
        debug!(caller = %ctx.caller, %id, %dna, "zombie dna changed");
        Ok(Receipt::new((), DomainEvent::DnaChanged { id, dna }))
    }

    fn authorize(
        &self,
        state: &RegistryState,
        ctx: &CallContext,
        id: ZombieId,
        required: u32,
    ) -> Result<(), CoreError> {
        let level = state.store.get(id)?.level;
        if state.ownership.owner_of(id)? != ctx.caller {
            return Err(CoreError::Unauthorized {
                caller: ctx.caller,
                id,
            });
        }
        if level < required {
            return Err(CoreError::LevelTooLow {
                id,
                required,
                actual: level,
            });
        }
        Ok(())
    }
}
