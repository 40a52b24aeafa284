//! Registry configuration.
//!
//! [`RegistryConfig`] collects every tunable of the core. Defaults match the
//! deployed game: one self-minted zombie per account, a one-day cooldown, a
//! 70% base win chance, renames from level 2, genome swaps from level 20.

use serde::{Deserialize, Serialize};

use crate::combat::{CombatEngine, VictoryPolicy};
use crate::creation::CreationService;
use crate::helper::ZombieHelper;

/// One day, in seconds.
pub const DEFAULT_COOLDOWN_SECS: u64 = 86_400;

/// Configuration for a registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of self-minted zombies an account may hold.
    pub creation_cap: usize,
    /// Cooldown after creation and after every attack, in seconds.
    pub cooldown_secs: u64,
    /// Win-probability curve.
    pub victory: VictoryPolicy,
    /// Minimum level for renaming.
    pub rename_level: u32,
    /// Minimum level for replacing the genome.
    pub dna_change_level: u32,
    /// Seed for the execution context's per-call generator.
    pub rng_seed: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            creation_cap: 1,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            victory: VictoryPolicy::default(),
            rename_level: 2,
            dna_change_level: 20,
            rng_seed: 0,
        }
    }
}

/// Errors produced when validating a [`RegistryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("creation_cap must be at least 1")]
    ZeroCap,

    #[error("cooldown_secs must be positive")]
    ZeroCooldown,

    #[error(
        "victory percentages must satisfy min <= base <= max <= 100, got min={min} base={base} max={max}"
    )]
    BadVictoryPolicy { min: u8, base: u8, max: u8 },

    #[error("failed to parse registry config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RegistryConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.creation_cap == 0 {
            return Err(ConfigError::ZeroCap);
        }
        if self.cooldown_secs == 0 {
            return Err(ConfigError::ZeroCooldown);
        }
        let VictoryPolicy {
            base_percent: base,
            min_percent: min,
            max_percent: max,
            ..
        } = self.victory;
        if !(min <= base && base <= max && max <= 100) {
            return Err(ConfigError::BadVictoryPolicy { min, base, max });
        }
        Ok(())
    }

    /// Parse a JSON document and validate it. Missing fields take their
    /// default values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn creation_service(&self) -> CreationService {
        CreationService::new(self.creation_cap, self.cooldown_secs)
    }

    pub fn combat_engine(&self) -> CombatEngine {
        CombatEngine::new(self.cooldown_secs, self.victory)
    }

    pub fn helper(&self) -> ZombieHelper {
        ZombieHelper::new(self.rename_level, self.dna_change_level)
    }
}
