//! Canonical zombie table.
//!
//! [`EntityStore`] owns every [`Zombie`] ever minted. Records are appended in
//! id order and never removed, so lookup is a bounds-checked index. The store
//! knows nothing about ownership or authorization; it only enforces that the
//! id being touched exists.

use serde::{Deserialize, Serialize};

use crate::account::{Account, Timestamp};
use crate::entity::{Dna, Zombie, ZombieId};
use crate::CoreError;

/// Owns all zombie records, indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    zombies: Vec<Zombie>,
}

impl EntityStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            zombies: Vec::new(),
        }
    }

    /// Append a new zombie and return its id.
    ///
    /// The record starts at level 1 with zero counters and
    /// `ready_time = now`. Ids are the next unused index and are never
    /// reclaimed.
    pub fn allocate(&mut self, name: String, dna: Dna, creator: Account, now: Timestamp) -> ZombieId {
        let id = ZombieId(self.zombies.len() as u64);
        self.zombies.push(Zombie {
            id,
            name,
            dna,
            level: 1,
            ready_time: now,
            win_count: 0,
            loss_count: 0,
            creator,
        });
        id
    }

    /// The id the next [`allocate`](Self::allocate) call will return.
    pub fn next_id(&self) -> ZombieId {
        ZombieId(self.zombies.len() as u64)
    }

    /// Look up a zombie.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if `id` was never allocated.
    pub fn get(&self, id: ZombieId) -> Result<&Zombie, CoreError> {
        id.index()
            .and_then(|index| self.zombies.get(index))
            .ok_or(CoreError::NotFound { id })
    }

    /// Returns `true` if `id` was allocated.
    pub fn contains(&self, id: ZombieId) -> bool {
        id.index().is_some_and(|index| index < self.zombies.len())
    }

    /// Number of zombies ever allocated.
    pub fn len(&self) -> usize {
        self.zombies.len()
    }

    /// Whether no zombie has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.zombies.is_empty()
    }

    /// All zombies in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Zombie> {
        self.zombies.iter()
    }

    /// Move the cooldown deadline. A time earlier than the current
    /// `ready_time` is ignored; the deadline never moves backwards.
    pub fn set_ready_time(&mut self, id: ZombieId, time: Timestamp) -> Result<(), CoreError> {
        let zombie = self.get_mut(id)?;
        zombie.ready_time = zombie.ready_time.max(time);
        Ok(())
    }

    /// Overwrite the level.
    pub fn set_level(&mut self, id: ZombieId, level: u32) -> Result<(), CoreError> {
        self.get_mut(id)?.level = level;
        Ok(())
    }

    /// Add one win.
    pub fn increment_win(&mut self, id: ZombieId) -> Result<(), CoreError> {
        let zombie = self.get_mut(id)?;
        zombie.win_count = zombie.win_count.saturating_add(1);
        Ok(())
    }

    /// Add one loss.
    pub fn increment_loss(&mut self, id: ZombieId) -> Result<(), CoreError> {
        let zombie = self.get_mut(id)?;
        zombie.loss_count = zombie.loss_count.saturating_add(1);
        Ok(())
    }

    /// Overwrite the name.
    pub fn set_name(&mut self, id: ZombieId, name: String) -> Result<(), CoreError> {
        self.get_mut(id)?.name = name;
        Ok(())
    }

    /// Overwrite the genome.
    pub fn set_dna(&mut self, id: ZombieId, dna: Dna) -> Result<(), CoreError> {
        self.get_mut(id)?.dna = dna;
        Ok(())
    }

    fn get_mut(&mut self, id: ZombieId) -> Result<&mut Zombie, CoreError> {
        id.index()
            .and_then(|index| self.zombies.get_mut(index))
            .ok_or(CoreError::NotFound { id })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Account {
        Account::derive("alice")
    }

    #[test]
    fn allocate_assigns_sequential_ids() {
        let mut store = EntityStore::new();
        let ids: Vec<ZombieId> = (0..5)
            .map(|i| store.allocate(format!("z{i}"), Dna::from_raw(i), alice(), Timestamp(0)))
            .collect();
        assert_eq!(
            ids,
            (0..5).map(ZombieId).collect::<Vec<_>>(),
            "ids are dense and ascending"
        );
        assert_eq!(store.next_id(), ZombieId(5));
    }

    #[test]
    fn allocate_sets_defaults() {
        let mut store = EntityStore::new();
        let id = store.allocate("Zombie 1".to_owned(), Dna::from_raw(7), alice(), Timestamp(50));
        let z = store.get(id).unwrap();
        assert_eq!(z.level, 1);
        assert_eq!(z.win_count, 0);
        assert_eq!(z.loss_count, 0);
        assert_eq!(z.ready_time, Timestamp(50));
        assert_eq!(z.creator, alice());
    }

    #[test]
    fn unknown_id_is_not_found_everywhere() {
        let mut store = EntityStore::new();
        let missing = ZombieId(9);
        assert_eq!(store.get(missing), Err(CoreError::NotFound { id: missing }));
        assert!(store.set_level(missing, 3).is_err());
        assert!(store.set_ready_time(missing, Timestamp(1)).is_err());
        assert!(store.increment_win(missing).is_err());
        assert!(store.increment_loss(missing).is_err());
        assert!(!store.contains(missing));
    }

    #[test]
    fn wide_ids_never_alias_low_slots() {
        let mut store = EntityStore::new();
        store.allocate("Zombie 1".to_owned(), Dna::from_raw(1), alice(), Timestamp(0));
        for wide in [ZombieId(1 << 32), ZombieId(u64::MAX)] {
            assert_eq!(store.get(wide), Err(CoreError::NotFound { id: wide }));
            assert!(!store.contains(wide));
            assert!(store.set_level(wide, 2).is_err());
        }
        assert_eq!(store.get(ZombieId(0)).unwrap().level, 1);
    }

    #[test]
    fn ready_time_never_moves_backwards() {
        let mut store = EntityStore::new();
        let id = store.allocate("z".to_owned(), Dna::from_raw(1), alice(), Timestamp(100));
        store.set_ready_time(id, Timestamp(500)).unwrap();
        store.set_ready_time(id, Timestamp(200)).unwrap();
        assert_eq!(store.get(id).unwrap().ready_time, Timestamp(500));
    }

    #[test]
    fn counters_increment_independently() {
        let mut store = EntityStore::new();
        let id = store.allocate("z".to_owned(), Dna::from_raw(1), alice(), Timestamp(0));
        store.increment_win(id).unwrap();
        store.increment_win(id).unwrap();
        store.increment_loss(id).unwrap();
        let z = store.get(id).unwrap();
        assert_eq!((z.win_count, z.loss_count), (2, 1));
    }
}
