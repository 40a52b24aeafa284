//! The execution context around the core.
//!
//! [`ZombieRegistry`] is what callers talk to. It owns the
//! [`RegistryState`], a monotonic simulated clock, the contract owner, the
//! event journal, and the per-call generator, and it exposes the external
//! call surface:
//!
//! | Call                       | Core service                  | Event                 |
//! |----------------------------|-------------------------------|-----------------------|
//! | `create_random_zombie`     | [`CreationService::create`]   | `Creation`            |
//! | `approve`                  | [`OwnershipRegistry::approve`]| `Approval`            |
//! | `transfer_from`            | [`OwnershipRegistry::transfer_from`] | `Transfer`     |
//! | `attack`                   | [`CombatEngine::attack`]      | `CombatResult`        |
//! | `change_name`/`change_dna` | [`ZombieHelper`]              | `NameChanged`/`DnaChanged` |
//!
//! Calls are applied one at a time and in full. A rejected call leaves the
//! state, the journal, and the generator position exactly as they were.
//!
//! # Randomness
//!
//! Each call gets a fresh [`Pcg64`] seeded from `(rng_seed, nonce)`, where
//! `nonce` counts successful calls. Replaying the same calls from the same
//! snapshot therefore reproduces every genome and every combat roll.
//!
//! [`OwnershipRegistry::approve`]: zombie_core::ownership::OwnershipRegistry::approve
//! [`OwnershipRegistry::transfer_from`]: zombie_core::ownership::OwnershipRegistry::transfer_from

use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::{debug, info, warn};

use zombie_core::prelude::*;

use crate::RegistryError;

/// Mixes the call nonce into the configured seed.
const NONCE_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A deployed zombie registry.
#[derive(Debug, Clone)]
pub struct ZombieRegistry {
    pub(crate) state: RegistryState,
    pub(crate) config: RegistryConfig,
    creation: CreationService,
    combat: CombatEngine,
    helper: ZombieHelper,
    pub(crate) contract_owner: Account,
    pub(crate) clock: Timestamp,
    pub(crate) nonce: u64,
    pub(crate) destroyed: bool,
    journal: EventJournal,
}

impl ZombieRegistry {
    /// Deploy a registry with the default configuration. `deployer`
    /// becomes the contract owner.
    pub fn new(deployer: Account) -> Self {
        Self::launch(deployer, RegistryConfig::default())
    }

    /// Deploy a registry with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is inconsistent.
    pub fn deploy(deployer: Account, config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::launch(deployer, config))
    }

    fn launch(deployer: Account, config: RegistryConfig) -> Self {
        info!(%deployer, cap = config.creation_cap, cooldown = config.cooldown_secs, "registry deployed");
        Self::assemble(
            RegistryState::new(),
            config,
            deployer,
            Timestamp::EPOCH,
            0,
            false,
        )
    }

    pub(crate) fn assemble(
        state: RegistryState,
        config: RegistryConfig,
        contract_owner: Account,
        clock: Timestamp,
        nonce: u64,
        destroyed: bool,
    ) -> Self {
        Self {
            creation: config.creation_service(),
            combat: config.combat_engine(),
            helper: config.helper(),
            state,
            config,
            contract_owner,
            clock,
            nonce,
            destroyed,
            journal: EventJournal::new(),
        }
    }

    // -- clock --------------------------------------------------------------

    /// Current simulated time.
    pub fn now(&self) -> Timestamp {
        self.clock
    }

    /// Move the clock forward by `secs`. Time never goes backwards.
    pub fn advance_time(&mut self, secs: u64) {
        self.clock = self.clock.saturating_add(secs);
        debug!(now = %self.clock, "clock advanced");
    }

    // -- contract ownership -------------------------------------------------

    /// The contract owner (initially the deployer).
    pub fn owner(&self) -> Result<Account, RegistryError> {
        self.ensure_live()?;
        Ok(self.contract_owner)
    }

    /// Hand contract ownership to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        caller: Account,
        new_owner: Account,
    ) -> Result<Receipt<()>, RegistryError> {
        self.ensure_contract_owner(caller)?;
        let previous = self.contract_owner;
        self.contract_owner = new_owner;
        info!(%previous, new = %new_owner, "contract ownership transferred");
        let receipt = Receipt::new(
            (),
            DomainEvent::OwnershipTransferred {
                previous,
                new: new_owner,
            },
        );
        Ok(self.commit(caller, receipt))
    }

    /// Permanently disable the registry. Every later call fails with
    /// [`RegistryError::Destroyed`].
    pub fn kill(&mut self, caller: Account) -> Result<(), RegistryError> {
        self.ensure_contract_owner(caller)?;
        self.destroyed = true;
        info!(%caller, zombies = self.state.store().len(), "registry destroyed");
        Ok(())
    }

    /// Whether [`kill`](Self::kill) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // -- mutating calls -----------------------------------------------------

    /// Mint a zombie named `name` for `caller`.
    pub fn create_random_zombie(
        &mut self,
        caller: Account,
        name: &str,
    ) -> Result<Receipt<ZombieId>, RegistryError> {
        self.ensure_live()?;
        let ctx = self.context(caller);
        let mut rng = self.call_rng();
        let result = self.creation.create(&mut self.state, &ctx, name, &mut rng);
        self.finish("create_random_zombie", &ctx, result)
    }

    /// Name `approved` as the transfer delegate for `id`.
    pub fn approve(
        &mut self,
        caller: Account,
        approved: Account,
        id: ZombieId,
    ) -> Result<Receipt<()>, RegistryError> {
        self.ensure_live()?;
        let ctx = self.context(caller);
        let result = self.state.approve(&ctx, id, approved);
        self.finish("approve", &ctx, result)
    }

    /// Move `id` from `from` to `to`.
    pub fn transfer_from(
        &mut self,
        caller: Account,
        from: Account,
        to: Account,
        id: ZombieId,
    ) -> Result<Receipt<()>, RegistryError> {
        self.ensure_live()?;
        let ctx = self.context(caller);
        let result = self.state.transfer_from(&ctx, from, to, id);
        self.finish("transfer_from", &ctx, result)
    }

    /// Attack `defender` with `attacker`.
    pub fn attack(
        &mut self,
        caller: Account,
        attacker: ZombieId,
        defender: ZombieId,
    ) -> Result<Receipt<CombatOutcome>, RegistryError> {
        self.ensure_live()?;
        let ctx = self.context(caller);
        let mut rng = self.call_rng();
        let result = self
            .combat
            .attack(&mut self.state, &ctx, attacker, defender, &mut rng);
        self.finish("attack", &ctx, result)
    }

    /// Rename a zombie the caller owns.
    pub fn change_name(
        &mut self,
        caller: Account,
        id: ZombieId,
        name: &str,
    ) -> Result<Receipt<()>, RegistryError> {
        self.ensure_live()?;
        let ctx = self.context(caller);
        let result = self.helper.change_name(&mut self.state, &ctx, id, name);
        self.finish("change_name", &ctx, result)
    }

    /// Replace the genome of a zombie the caller owns.
    pub fn change_dna(
        &mut self,
        caller: Account,
        id: ZombieId,
        dna: u64,
    ) -> Result<Receipt<()>, RegistryError> {
        self.ensure_live()?;
        let ctx = self.context(caller);
        let result = self.helper.change_dna(&mut self.state, &ctx, id, dna);
        self.finish("change_dna", &ctx, result)
    }

    // -- reads --------------------------------------------------------------

    /// Current owner of `id`.
    pub fn owner_of(&self, id: ZombieId) -> Result<Account, RegistryError> {
        self.ensure_live()?;
        Ok(self.state.owner_of(id)?)
    }

    /// Number of zombies `account` holds.
    pub fn balance_of(&self, account: Account) -> Result<usize, RegistryError> {
        self.ensure_live()?;
        Ok(self.state.ownership().balance_of(account))
    }

    /// Zombies `account` holds, ascending.
    pub fn zombies_by_owner(&self, account: Account) -> Result<Vec<ZombieId>, RegistryError> {
        self.ensure_live()?;
        Ok(self.state.ownership().zombies_of(account).collect())
    }

    /// The approved delegate for `id`, if any.
    pub fn get_approved(&self, id: ZombieId) -> Result<Option<Account>, RegistryError> {
        self.ensure_live()?;
        self.state.owner_of(id)?;
        Ok(self.state.ownership().get_approved(id))
    }

    /// A copy of the zombie record.
    pub fn zombie(&self, id: ZombieId) -> Result<Zombie, RegistryError> {
        self.ensure_live()?;
        Ok(self.state.zombie(id)?.clone())
    }

    /// Number of zombies ever minted.
    pub fn zombie_count(&self) -> usize {
        self.state.store().len()
    }

    /// Read-only access to the underlying state.
    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    /// The configuration this registry was deployed with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// All events emitted by successful calls since deploy (or restore).
    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    // -- internals ----------------------------------------------------------

    fn context(&self, caller: Account) -> CallContext {
        CallContext::new(caller, self.clock)
    }

    fn call_rng(&self) -> Pcg64 {
        Pcg64::seed_from_u64(self.config.rng_seed ^ self.nonce.wrapping_mul(NONCE_MIX))
    }

    fn ensure_live(&self) -> Result<(), RegistryError> {
        if self.destroyed {
            return Err(RegistryError::Destroyed);
        }
        Ok(())
    }

    fn ensure_contract_owner(&self, caller: Account) -> Result<(), RegistryError> {
        self.ensure_live()?;
        if caller != self.contract_owner {
            warn!(%caller, "rejected: caller is not the contract owner");
            return Err(RegistryError::NotContractOwner { caller });
        }
        Ok(())
    }

    fn finish<T>(
        &mut self,
        call: &str,
        ctx: &CallContext,
        result: Result<Receipt<T>, CoreError>,
    ) -> Result<Receipt<T>, RegistryError> {
        match result {
            Ok(receipt) => Ok(self.commit(ctx.caller, receipt)),
            Err(err) => {
                warn!(call, caller = %ctx.caller, reason = err.reason(), "call rejected: {err}");
                Err(err.into())
            }
        }
    }

    fn commit<T>(&mut self, caller: Account, receipt: Receipt<T>) -> Receipt<T> {
        let ctx = self.context(caller);
        self.nonce += 1;
        self.journal.record(&ctx, receipt.events.iter().cloned());
        receipt
    }
}
