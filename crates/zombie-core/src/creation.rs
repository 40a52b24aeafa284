//! Minting new zombies.
//!
//! [`CreationService::create`] validates the name, enforces the per-account
//! creation quota, draws one value from the injected generator to derive the
//! genome, allocates the record, puts it into its creation cooldown, and
//! registers the caller as owner.

use rand::RngCore;
use tracing::debug;

use crate::account::CallContext;
use crate::entity::{Dna, ZombieId};
use crate::event::{DomainEvent, Receipt};
use crate::state::RegistryState;
use crate::CoreError;

/// Mints zombies subject to a per-account quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationService {
    /// Maximum number of self-minted zombies an account may hold.
    pub cap: usize,
    /// Cooldown applied to a freshly minted zombie, in seconds.
    pub cooldown_secs: u64,
}

impl CreationService {
    /// Build a service with the given quota and cooldown.
    pub fn new(cap: usize, cooldown_secs: u64) -> Self {
        Self { cap, cooldown_secs }
    }

    /// Mint a zombie named `name` for the caller.
    ///
    /// The new zombie starts in the cooling state: its `ready_time` is
    /// `now + cooldown_secs`. Emits [`DomainEvent::Creation`] with `(id, name,
    /// dna)` in that order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidName`] if `name` is empty or only whitespace.
    /// - [`CoreError::QuotaExceeded`] if the caller already holds `cap`
    ///   zombies it minted itself.
    pub fn create<R: RngCore + ?Sized>(
        &self,
        state: &mut RegistryState,
        ctx: &CallContext,
        name: &str,
        rng: &mut R,
    ) -> Result<Receipt<ZombieId>, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidName);
        }
        let held = state.created_and_held(ctx.caller);
        if held >= self.cap {
            return Err(CoreError::QuotaExceeded {
                account: ctx.caller,
                cap: self.cap,
            });
        }

        let dna = Dna::derive(name, rng.next_u64());

        let id = state
            .store
            .allocate(name.to_owned(), dna, ctx.caller, ctx.now);
        state
            .store
            .set_ready_time(id, ctx.now.saturating_add(self.cooldown_secs))?;
        state.ownership.register(id, ctx.caller);
        debug!(caller = %ctx.caller, %id, name, %dna, "zombie created");

        Ok(Receipt::new(
            id,
            DomainEvent::Creation {
                id,
                name: name.to_owned(),
                dna,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
