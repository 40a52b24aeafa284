//! Cooldown-gated attack resolution.
//!
//! An attack goes through four gates in order: both zombies exist (and are
//! distinct), the caller owns the attacker, and the attacker's cooldown has
//! elapsed. Only then is a single roll drawn from the injected generator and
//! compared against [`VictoryPolicy::win_percent`]. Whatever the outcome, the
//! attacker enters a fresh cooldown. The defender is never written.
//!
//! ```text
//!            authorized attack (win or lose)
//!   Ready ─────────────────────────────────────▶ Cooling
//!     ▲                                             │
//!     └──────────── now >= ready_time ──────────────┘
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::CallContext;
use crate::entity::ZombieId;
use crate::event::{CombatOutcome, DomainEvent, Receipt};
use crate::state::RegistryState;
use crate::CoreError;

// ---------------------------------------------------------------------------
// VictoryPolicy
// ---------------------------------------------------------------------------

/// Win-probability curve as a function of the level gap.
///
/// `win% = clamp(base + (attacker_level - defender_level) * per_level,
/// min, max)`. A roll in `0..100` strictly below `win%` is a victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryPolicy {
    /// Win chance between equal levels.
    pub base_percent: u8,
    /// Added per level the attacker is above the defender (subtracted when below).
    pub per_level_percent: u8,
    /// Floor.
    pub min_percent: u8,
    /// Ceiling.
    pub max_percent: u8,
}

impl Default for VictoryPolicy {
    fn default() -> Self {
        Self {
            base_percent: 70,
            per_level_percent: 5,
            min_percent: 5,
            max_percent: 95,
        }
    }
}

impl VictoryPolicy {
    /// Chance (0-100) that an attacker at `attacker_level` beats a defender at
    /// `defender_level`.
    ///
    /// Never panics: if `min_percent > max_percent` the ceiling wins, and the
    /// result never exceeds 100.
    pub fn win_percent(&self, attacker_level: u32, defender_level: u32) -> u8 {
        let gap = i64::from(attacker_level) - i64::from(defender_level);
        let raw = i64::from(self.base_percent) + gap * i64::from(self.per_level_percent);
        raw.max(i64::from(self.min_percent))
            .min(i64::from(self.max_percent))
            .clamp(0, 100) as u8
    }

    /// Pure resolution of one attack given a roll in `0..100`.
    pub fn resolve(&self, attacker_level: u32, defender_level: u32, roll: u8) -> CombatOutcome {
        if roll < self.win_percent(attacker_level, defender_level) {
            CombatOutcome::Victory
        } else {
            CombatOutcome::Defeat
        }
    }
}

// ---------------------------------------------------------------------------
// CombatEngine
// ---------------------------------------------------------------------------

/// Resolves attacks between zombies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatEngine {
    /// Cooldown applied to the attacker after every attack, in seconds.
    pub cooldown_secs: u64,
    /// Win-probability curve.
    pub policy: VictoryPolicy,
}

impl CombatEngine {
    /// Build an engine with the given cooldown and policy.
    pub fn new(cooldown_secs: u64, policy: VictoryPolicy) -> Self {
        Self {
            cooldown_secs,
            policy,
        }
    }

    /// Attack `defender` with `attacker`.
    ///
    /// On victory the attacker gains a level and a win; on defeat it gains a
    /// loss. Either way its `ready_time` becomes `now + cooldown_secs`.
    /// Emits [`DomainEvent::CombatResult`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if either zombie does not exist.
    /// - [`CoreError::InvalidTarget`] if `attacker == defender`.
    /// - [`CoreError::Unauthorized`] unless the caller owns `attacker`.
    /// - [`CoreError::NotReady`] if the attacker is still cooling down.
    pub fn attack<R: RngCore + ?Sized>(
        &self,
        state: &mut RegistryState,
        ctx: &CallContext,
        attacker: ZombieId,
        defender: ZombieId,
        rng: &mut R,
    ) -> Result<Receipt<CombatOutcome>, CoreError> {
        let (attacker_level, ready_time) = {
            let z = state.store.get(attacker)?;
            (z.level, z.ready_time)
        };
        if attacker == defender {
            return Err(CoreError::InvalidTarget { id: attacker });
        }
        let defender_level = state.store.get(defender)?.level;

        if state.ownership.owner_of(attacker)? != ctx.caller {
            return Err(CoreError::Unauthorized {
                caller: ctx.caller,
                id: attacker,
            });
        }
        if ctx.now < ready_time {
            return Err(CoreError::NotReady {
                id: attacker,
                ready_at: ready_time,
            });
        }

        let roll = (rng.next_u64() % 100) as u8;
        let outcome = self.policy.resolve(attacker_level, defender_level, roll);

        match outcome {
            CombatOutcome::Victory => {
                state.store.increment_win(attacker)?;
                state
                    .store
                    .set_level(attacker, attacker_level.saturating_add(1))?;
            }
            CombatOutcome::Defeat => state.store.increment_loss(attacker)?,
        }
        state
            .store
            .set_ready_time(attacker, ctx.now.saturating_add(self.cooldown_secs))?;
        debug!(
            caller = %ctx.caller,
            %attacker,
            %defender,
            roll,
            outcome = outcome.as_str(),
            "attack resolved"
        );

        Ok(Receipt::new(
            outcome,
            DomainEvent::CombatResult {
                attacker,
                defender,
                outcome,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, Timestamp};
    use crate::creation::CreationService;
    use crate::entity::CombatState;
    use crate::testing::FixedRng;

    const DAY: u64 = 86_400;

    fn alice() -> Account {
        Account::derive("alice")
    }
    fn bob() -> Account {
        Account::derive("bob")
    }

    /// Alice owns #0, Bob owns #1, both minted at t=0.
    fn arena() -> RegistryState {
        let mut state = RegistryState::new();
        let creation = CreationService::new(1, DAY);
        for (who, name) in [(alice(), "Zombie 1"), (bob(), "Zombie 2")] {
            creation
                .create(
                    &mut state,
                    &CallContext::new(who, Timestamp(0)),
                    name,
                    &mut FixedRng(0),
                )
                .unwrap();
        }
        state
    }

    fn engine() -> CombatEngine {
        CombatEngine::new(DAY, VictoryPolicy::default())
    }

    #[test]
    fn win_percent_follows_level_gap() {
        let policy = VictoryPolicy::default();
        assert_eq!(policy.win_percent(1, 1), 70);
        assert_eq!(policy.win_percent(3, 1), 80);
        assert_eq!(policy.win_percent(1, 3), 60);
        assert_eq!(policy.win_percent(100, 1), 95, "clamped to max");
        assert_eq!(policy.win_percent(1, 100), 5, "clamped to min");
    }

    #[test]
    fn inverted_bounds_fall_back_to_ceiling() {
        let policy = VictoryPolicy {
            base_percent: 50,
            per_level_percent: 5,
            min_percent: 90,
            max_percent: 10,
        };
        assert_eq!(policy.win_percent(1, 1), 10);
        assert_eq!(policy.win_percent(50, 1), 10);

        let oversized = VictoryPolicy {
            base_percent: 200,
            per_level_percent: 0,
            min_percent: 150,
            max_percent: 250,
        };
        assert_eq!(oversized.win_percent(1, 1), 100);
    }

    #[test]
    fn unvalidated_policy_still_resolves_attacks() {
        let mut state = arena();
        let inverted = CombatEngine::new(
            DAY,
            VictoryPolicy {
                base_percent: 50,
                per_level_percent: 5,
                min_percent: 90,
                max_percent: 10,
            },
        );
        let receipt = inverted
            .attack(
                &mut state,
                &CallContext::new(alice(), Timestamp(DAY)),
                ZombieId(0),
                ZombieId(1),
                &mut FixedRng(50),
            )
            .unwrap();
        assert_eq!(receipt.value, CombatOutcome::Defeat);
    }

    #[test]
    fn resolve_is_pure_in_the_roll() {
        let policy = VictoryPolicy::default();
        assert_eq!(policy.resolve(1, 1, 69), CombatOutcome::Victory);
        assert_eq!(policy.resolve(1, 1, 70), CombatOutcome::Defeat);
        assert_eq!(policy.resolve(1, 1, 69), policy.resolve(1, 1, 69));
    }

    #[test]
    fn fresh_zombie_is_cooling() {
        let mut state = arena();
        assert_eq!(
            state
                .zombie(ZombieId(0))
                .unwrap()
                .combat_state(Timestamp(DAY - 1)),
            CombatState::Cooling
        );
        let before = state.clone();
        let err = engine()
            .attack(
                &mut state,
                &CallContext::new(alice(), Timestamp(DAY - 1)),
                ZombieId(0),
                ZombieId(1),
                &mut FixedRng(0),
            )
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::NotReady {
                id: ZombieId(0),
                ready_at: Timestamp(DAY)
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn victory_levels_up_and_restarts_cooldown() {
        let mut state = arena();
        let receipt = engine()
            .attack(
                &mut state,
                &CallContext::new(alice(), Timestamp(DAY)),
                ZombieId(0),
                ZombieId(1),
                &mut FixedRng(10),
            )
            .unwrap();
        assert_eq!(receipt.value, CombatOutcome::Victory);

        let attacker = state.zombie(ZombieId(0)).unwrap();
        assert_eq!(attacker.level, 2);
        assert_eq!(attacker.win_count, 1);
        assert_eq!(attacker.loss_count, 0);
        assert_eq!(attacker.ready_time, Timestamp(2 * DAY));

        let defender = state.zombie(ZombieId(1)).unwrap();
        assert_eq!(defender.level, 1);
        assert_eq!((defender.win_count, defender.loss_count), (0, 0));
    }

    #[test]
    fn defeat_only_counts_a_loss() {
        let mut state = arena();
        let receipt = engine()
            .attack(
                &mut state,
                &CallContext::new(alice(), Timestamp(DAY + 5)),
                ZombieId(0),
                ZombieId(1),
                &mut FixedRng(99),
            )
            .unwrap();
        assert_eq!(receipt.value, CombatOutcome::Defeat);
        let attacker = state.zombie(ZombieId(0)).unwrap();
        assert_eq!(attacker.level, 1);
        assert_eq!(attacker.loss_count, 1);
        assert_eq!(attacker.ready_time, Timestamp(2 * DAY + 5));
    }

    #[test]
    fn second_attack_within_cooldown_is_rejected() {
        let mut state = arena();
        let ctx = CallContext::new(alice(), Timestamp(DAY));
        engine()
            .attack(&mut state, &ctx, ZombieId(0), ZombieId(1), &mut FixedRng(0))
            .unwrap();
        assert!(matches!(
            engine().attack(&mut state, &ctx, ZombieId(0), ZombieId(1), &mut FixedRng(0)),
            Err(CoreError::NotReady { .. })
        ));
    }

    #[test]
    fn only_owner_may_attack() {
        let mut state = arena();
        let err = engine()
            .attack(
                &mut state,
                &CallContext::new(bob(), Timestamp(DAY)),
                ZombieId(0),
                ZombieId(1),
                &mut FixedRng(0),
            )
            .unwrap_err();
        assert_eq!(err.reason(), "permission denied");
    }

    #[test]
    fn self_attack_and_unknown_ids_are_rejected() {
        let mut state = arena();
        let ctx = CallContext::new(alice(), Timestamp(DAY));
        assert_eq!(
            engine().attack(&mut state, &ctx, ZombieId(0), ZombieId(0), &mut FixedRng(0)),
            Err(CoreError::InvalidTarget { id: ZombieId(0) })
        );
        assert_eq!(
            engine().attack(&mut state, &ctx, ZombieId(0), ZombieId(7), &mut FixedRng(0)),
            Err(CoreError::NotFound { id: ZombieId(7) })
        );
        assert_eq!(
            engine().attack(&mut state, &ctx, ZombieId(7), ZombieId(0), &mut FixedRng(0)),
            Err(CoreError::NotFound { id: ZombieId(7) })
        );
    }

    #[test]
    fn cooling_defender_can_still_be_attacked() {
        let mut state = arena();
        // Bob's zombie attacks first so it is cooling when Alice attacks it.
        engine()
            .attack(
                &mut state,
                &CallContext::new(bob(), Timestamp(DAY)),
                ZombieId(1),
                ZombieId(0),
                &mut FixedRng(0),
            )
            .unwrap();
        assert!(engine()
            .attack(
                &mut state,
                &CallContext::new(alice(), Timestamp(DAY)),
                ZombieId(0),
                ZombieId(1),
                &mut FixedRng(0),
            )
            .is_ok());
    }
}
