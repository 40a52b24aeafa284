//! Single-owner bookkeeping, approval delegation, and transfer authorization.
//!
//! [`OwnershipRegistry`] keeps three tables:
//!
//! - `owners`: zombie -> owning account (exactly one per minted zombie),
//! - `holdings`: account -> set of zombies it owns (the owner index),
//! - `approvals`: zombie -> the single account allowed to transfer it on the
//!   owner's behalf.
//!
//! `owners` and `holdings` are only ever written together inside
//! [`OwnershipRegistry::register`] and [`OwnershipRegistry::transfer_from`],
//! so the owner index stays consistent by construction. Every operation runs
//! all of its checks before its first write; a rejected call leaves all three
//! tables untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::{Account, CallContext};
use crate::entity::ZombieId;
use crate::event::{DomainEvent, Receipt};
use crate::CoreError;

/// Ownership and approval tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnershipRegistry {
    owners: BTreeMap<ZombieId, Account>,
    holdings: BTreeMap<Account, BTreeSet<ZombieId>>,
    approvals: BTreeMap<ZombieId, Account>,
}

impl OwnershipRegistry {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the first owner of a freshly minted zombie.
    pub(crate) fn register(&mut self, id: ZombieId, owner: Account) {
        debug_assert!(!self.owners.contains_key(&id), "zombie {id} registered twice");
        self.owners.insert(id, owner);
        self.holdings.entry(owner).or_default().insert(id);
    }

    /// The current owner of `id`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if the zombie does not exist.
    pub fn owner_of(&self, id: ZombieId) -> Result<Account, CoreError> {
        self.owners
            .get(&id)
            .copied()
            .ok_or(CoreError::NotFound { id })
    }

    /// The approved delegate for `id`, if any.
    pub fn get_approved(&self, id: ZombieId) -> Option<Account> {
        self.approvals.get(&id).copied()
    }

    /// Number of zombies `account` currently holds.
    pub fn balance_of(&self, account: Account) -> usize {
        self.holdings.get(&account).map_or(0, BTreeSet::len)
    }

    /// Zombies held by `account`, ascending.
    pub fn zombies_of(&self, account: Account) -> impl Iterator<Item = ZombieId> + '_ {
        self.holdings
            .get(&account)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// Number of owned zombies across all accounts.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no zombie is owned yet.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Name `approved` as the sole transfer delegate for `id`.
    ///
    /// Overwrites any previous approval. Approving [`Account::ZERO`] clears
    /// the approval. Emits [`DomainEvent::Approval`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the zombie does not exist.
    /// - [`CoreError::Unauthorized`] unless the caller owns the zombie.
    pub fn approve(
        &mut self,
        ctx: &CallContext,
        id: ZombieId,
        approved: Account,
    ) -> Result<Receipt<()>, CoreError> {
        let owner = self.owner_of(id)?;
        if ctx.caller != owner {
            return Err(CoreError::Unauthorized {
                caller: ctx.caller,
                id,
            });
        }

        if approved == Account::ZERO {
            self.approvals.remove(&id);
        } else {
            self.approvals.insert(id, approved);
        }
        debug!(%owner, %approved, %id, "approval set");

        Ok(Receipt::new(
            (),
            DomainEvent::Approval {
                owner,
                approved,
                id,
            },
        ))
    }

    /// Move `id` from `from` to `to`.
    ///
    /// The caller must be the current owner or the approved delegate. On
    /// success the owner index moves with the owner field, the approval is
    /// cleared, and [`DomainEvent::Transfer`] is emitted. `to == from` is
    /// accepted: ownership stays put but the approval is still cleared.
    ///
    /// Authorization is checked before the `from` claim, so an account that
    /// no longer owns the zombie is told `permission denied` rather than
    /// being told who the owner is.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the zombie does not exist.
    /// - [`CoreError::Unauthorized`] if the caller is neither owner nor delegate.
    /// - [`CoreError::InvalidOwner`] if `from` is not the current owner.
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Account,
        to: Account,
        id: ZombieId,
    ) -> Result<Receipt<()>, CoreError> {
        let owner = self.owner_of(id)?;
        let delegate = self.get_approved(id);
        if ctx.caller != owner && delegate != Some(ctx.caller) {
            return Err(CoreError::Unauthorized {
                caller: ctx.caller,
                id,
            });
        }
        if from != owner {
            return Err(CoreError::InvalidOwner { id, claimed: from });
        }

        self.approvals.remove(&id);
        if from != to {
            if let Some(held) = self.holdings.get_mut(&from) {
                held.remove(&id);
                if held.is_empty() {
                    self.holdings.remove(&from);
                }
            }
            self.holdings.entry(to).or_default().insert(id);
            self.owners.insert(id, to);
        }
        debug!(caller = %ctx.caller, %from, %to, %id, "zombie transferred");

        Ok(Receipt::new((), DomainEvent::Transfer { from, to, id }))
    }

    pub(crate) fn owners(&self) -> &BTreeMap<ZombieId, Account> {
        &self.owners
    }

    pub(crate) fn holdings(&self) -> &BTreeMap<Account, BTreeSet<ZombieId>> {
        &self.holdings
    }

    pub(crate) fn approvals(&self) -> &BTreeMap<ZombieId, Account> {
        &self.approvals
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
