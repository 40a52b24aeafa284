//! The single owned state object all services operate on.
//!
//! [`RegistryState`] bundles the [`EntityStore`] and the
//! [`OwnershipRegistry`]. There is no ambient global: every service takes
//! `&mut RegistryState` explicitly, and snapshots serialize this struct
//! whole.

use serde::{Deserialize, Serialize};

use crate::account::{Account, CallContext};
use crate::entity::{Zombie, ZombieId};
use crate::event::Receipt;
use crate::ownership::OwnershipRegistry;
use crate::store::EntityStore;
use crate::{CoreError, IntegrityError};

/// Canonical registry state: zombie records plus ownership tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    pub(crate) store: EntityStore,
    pub(crate) ownership: OwnershipRegistry,
}

impl RegistryState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the zombie table.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Read-only access to the ownership tables.
    pub fn ownership(&self) -> &OwnershipRegistry {
        &self.ownership
    }

    /// Look up a zombie.
    pub fn zombie(&self, id: ZombieId) -> Result<&Zombie, CoreError> {
        self.store.get(id)
    }

    /// The current owner of `id`.
    pub fn owner_of(&self, id: ZombieId) -> Result<Account, CoreError> {
        self.ownership.owner_of(id)
    }

    /// Set the transfer delegate for `id`. See [`OwnershipRegistry::approve`].
    pub fn approve(
        &mut self,
        ctx: &CallContext,
        id: ZombieId,
        approved: Account,
    ) -> Result<Receipt<()>, CoreError> {
        self.ownership.approve(ctx, id, approved)
    }

    /// Transfer `id`. See [`OwnershipRegistry::transfer_from`].
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Account,
        to: Account,
        id: ZombieId,
    ) -> Result<Receipt<()>, CoreError> {
        self.ownership.transfer_from(ctx, from, to, id)
    }

    /// Zombies that `account` both minted and still holds.
    ///
    /// This is what the creation quota counts: zombies received by transfer
    /// never count, and a zombie given away stops counting for its creator.
    pub fn created_and_held(&self, account: Account) -> usize {
        self.ownership
            .zombies_of(account)
            .filter(|id| {
                self.store
                    .get(*id)
                    .is_ok_and(|zombie| zombie.creator == account)
            })
            .count()
    }

    /// Verify the structural invariants that tie the tables together.
    ///
    /// - Every zombie's id equals its store index.
    /// - Every zombie has exactly one owner, and nothing unknown is owned.
    /// - The owner index agrees with the owner map and has no empty sets.
    /// - Approvals only name existing zombies.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        for (index, zombie) in self.store.iter().enumerate() {
            if zombie.id.to_raw() != index as u64 {
                return Err(IntegrityError::IdMismatch {
                    index,
                    id: zombie.id,
                });
            }
            if !self.ownership.owners().contains_key(&zombie.id) {
                return Err(IntegrityError::Unowned { id: zombie.id });
            }
        }

        for (&id, owner) in self.ownership.owners() {
            if !self.store.contains(id) {
                return Err(IntegrityError::UnknownOwned { id });
            }
            let indexed = self
                .ownership
                .holdings()
                .get(owner)
                .is_some_and(|ids| ids.contains(&id));
            if !indexed {
                return Err(IntegrityError::OwnerIndexMismatch { id });
            }
        }

        let mut indexed_total = 0;
        for (account, ids) in self.ownership.holdings() {
            if ids.is_empty() {
                return Err(IntegrityError::EmptyHolding { account: *account });
            }
            for id in ids {
                if self.ownership.owners().get(id) != Some(account) {
                    return Err(IntegrityError::OwnerIndexMismatch { id: *id });
                }
            }
            indexed_total += ids.len();
        }
        if indexed_total != self.ownership.len() {
            return Err(IntegrityError::HoldingCountMismatch {
                indexed: indexed_total,
                owned: self.ownership.len(),
            });
        }

        if let Some(&id) = self
            .ownership
            .approvals()
            .keys()
            .find(|id| !self.store.contains(**id))
        {
            return Err(IntegrityError::OrphanApproval { id });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Timestamp;
    use crate::entity::Dna;

    fn mint(state: &mut RegistryState, creator: Account) -> ZombieId {
        let id = state
            .store
            .allocate("z".to_owned(), Dna::from_raw(1), creator, Timestamp(0));
        state.ownership.register(id, creator);
        id
    }

    #[test]
    fn empty_state_is_consistent() {
        assert_eq!(RegistryState::new().check_integrity(), Ok(()));
    }

    #[test]
    fn created_and_held_ignores_received_zombies() {
        let alice = Account::derive("alice");
        let bob = Account::derive("bob");
        let mut state = RegistryState::new();
        let id = mint(&mut state, alice);
        assert_eq!(state.created_and_held(alice), 1);

        state
            .transfer_from(&CallContext::new(alice, Timestamp(0)), alice, bob, id)
            .unwrap();
        assert_eq!(state.created_and_held(alice), 0);
        assert_eq!(state.created_and_held(bob), 0);
        assert_eq!(state.ownership().balance_of(bob), 1);
        assert_eq!(state.check_integrity(), Ok(()));
    }

    #[test]
    fn unregistered_zombie_fails_integrity() {
        let mut state = RegistryState::new();
        state.store.allocate(
            "ghost".to_owned(),
            Dna::from_raw(1),
            Account::derive("alice"),
            Timestamp(0),
        );
        assert_eq!(
            state.check_integrity(),
            Err(IntegrityError::Unowned { id: ZombieId(0) })
        );
    }

    #[test]
    fn owning_an_unknown_zombie_fails_integrity() {
        let mut state = RegistryState::new();
        state
            .ownership
            .register(ZombieId(5), Account::derive("alice"));
        assert_eq!(
            state.check_integrity(),
            Err(IntegrityError::UnknownOwned { id: ZombieId(5) })
        );
    }
}
