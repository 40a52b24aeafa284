//! Registry snapshot tests: capture, restore, hash, branching.
//!
//! These tests validate the [`RegistrySnapshot`] round-trip (capture ->
//! restore), BLAKE3 hash correctness, and snapshot-based branching where two
//! registries restored from the same snapshot must stay in lockstep.

use zombie_engine::prelude::*;

const DAY: u64 = 86_400;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn populated_registry() -> ZombieRegistry {
    let alice = Account::derive("alice");
    let bob = Account::derive("bob");
    let mut registry = ZombieRegistry::new(Account::derive("deployer"));

    let a = registry.create_random_zombie(alice, "Zombie 1").unwrap().value;
    let b = registry.create_random_zombie(bob, "Zombie 2").unwrap().value;
    registry.approve(bob, alice, b).unwrap();
    registry.advance_time(DAY);
    registry.attack(alice, a, b).unwrap();
    registry
}

// ---------------------------------------------------------------------------
// Capture / restore
// ---------------------------------------------------------------------------

#[test]
fn capture_restore_roundtrip() {
    let mut registry = populated_registry();
    let snapshot = registry.capture_snapshot();
    let before = registry.zombie(ZombieId(0)).unwrap();

    registry.advance_time(DAY);
    registry
        .create_random_zombie(Account::derive("carol"), "Zombie 3")
        .unwrap();
    assert_ne!(registry.state_hash(), snapshot.hash);

    registry.restore_from_snapshot(&snapshot).unwrap();
    assert_eq!(registry.state_hash(), snapshot.hash);
    assert_eq!(registry.zombie_count(), 2);
    assert_eq!(registry.now(), Timestamp(DAY));
    assert_eq!(registry.zombie(ZombieId(0)).unwrap(), before);
    assert_eq!(
        registry.get_approved(ZombieId(1)).unwrap(),
        Some(Account::derive("alice"))
    );
}

#[test]
fn restore_resets_journal() {
    let mut registry = populated_registry();
    assert!(!registry.journal().is_empty());

    let snapshot = registry.capture_snapshot();
    registry.restore_from_snapshot(&snapshot).unwrap();
    assert!(registry.journal().is_empty());
}

#[test]
fn snapshot_survives_json() {
    let registry = populated_registry();
    let snapshot = registry.capture_snapshot();

    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let decoded: RegistrySnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);

    let rebuilt = ZombieRegistry::from_snapshot(&decoded).unwrap();
    assert_eq!(rebuilt.state_hash(), snapshot.hash);
    assert_eq!(rebuilt.owner().unwrap(), Account::derive("deployer"));
}

#[test]
fn killed_flag_is_restored() {
    let deployer = Account::derive("deployer");
    let mut registry = ZombieRegistry::new(deployer);
    registry.kill(deployer).unwrap();

    let rebuilt = ZombieRegistry::from_snapshot(&registry.capture_snapshot()).unwrap();
    assert!(rebuilt.is_destroyed());
    assert_eq!(rebuilt.owner(), Err(RegistryError::Destroyed));
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

#[test]
fn hash_is_stable_and_hex() {
    let registry = populated_registry();
    let hash = registry.state_hash();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(hash, registry.state_hash());
    assert_eq!(hash, populated_registry().state_hash());
}

#[test]
fn clock_and_nonce_are_part_of_the_hash() {
    let mut registry = populated_registry();
    let base = registry.state_hash();

    registry.advance_time(1);
    let after_tick = registry.state_hash();
    assert_ne!(base, after_tick);

    // A rejected call changes nothing, a successful one bumps the nonce.
    let _ = registry.create_random_zombie(Account::derive("alice"), "again");
    assert_eq!(registry.state_hash(), after_tick);
    registry
        .transfer_ownership(Account::derive("deployer"), Account::derive("deployer"))
        .unwrap();
    assert_ne!(registry.state_hash(), after_tick);
}

// ---------------------------------------------------------------------------
// Tamper detection
// ---------------------------------------------------------------------------

#[test]
fn tampered_snapshot_is_rejected() {
    let mut registry = populated_registry();
    let original_hash = registry.state_hash();

    let mut snapshot = registry.capture_snapshot();
    snapshot.clock = Timestamp(0);

    let err = registry.restore_from_snapshot(&snapshot).unwrap_err();
    assert!(err.to_string().contains("hash mismatch"), "got: {err}");
    assert_eq!(registry.state_hash(), original_hash);
}

#[test]
fn tampered_hash_is_rejected() {
    let mut snapshot = populated_registry().capture_snapshot();
    snapshot.hash = "0".repeat(64);
    assert!(ZombieRegistry::from_snapshot(&snapshot).is_err());
}

// ---------------------------------------------------------------------------
// Branching
// ---------------------------------------------------------------------------

#[test]
fn branches_from_one_snapshot_stay_in_lockstep() {
    let snapshot = populated_registry().capture_snapshot();
    let mut left = ZombieRegistry::from_snapshot(&snapshot).unwrap();
    let mut right = ZombieRegistry::from_snapshot(&snapshot).unwrap();

    let carol = Account::derive("carol");
    for registry in [&mut left, &mut right] {
        registry.create_random_zombie(carol, "Zombie 3").unwrap();
        registry.advance_time(DAY);
        registry
            .attack(Account::derive("alice"), ZombieId(0), ZombieId(2))
            .unwrap();
    }

    assert_eq!(left.state_hash(), right.state_hash());
    assert_eq!(
        left.zombie(ZombieId(0)).unwrap(),
        right.zombie(ZombieId(0)).unwrap()
    );
}
