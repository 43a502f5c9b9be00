//! Tunable engine parameters and the tables that drive combat and spawning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MAX_BOTS, MAX_TOWERS};

/// Order in which bots are moved during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSchedule {
    /// A single live bot moves per tick, cycling through the store.
    RoundRobin,
    /// Every live bot moves once per tick in store order.
    FullPass,
}

/// Parameters of a single level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Display name of the level.
    pub name: String,
    /// Health assigned to every bot spawned while the level is active.
    pub health_points: u8,
    /// Gold awarded for every bot destroyed while the level is active.
    pub kill_reward: u16,
}

impl LevelSpec {
    /// Creates a level description.
    #[must_use]
    pub fn new(name: impl Into<String>, health_points: u8, kill_reward: u16) -> Self {
        Self {
            name: name.into(),
            health_points,
            kill_reward,
        }
    }
}

/// Monotonic tower level to damage lookup.
///
/// Entry `i` holds the damage dealt by a level `i + 1` tower. Levels without
/// an entry deal no damage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageTable {
    per_level: Vec<u8>,
}

impl DamageTable {
    /// Builds a table from per-level damage values starting at level 1.
    #[must_use]
    pub fn new(per_level: Vec<u8>) -> Self {
        Self { per_level }
    }

    /// Damage dealt by a tower of the provided level.
    #[must_use]
    pub fn damage_for(&self, level: u8) -> u8 {
        usize::from(level)
            .checked_sub(1)
            .and_then(|index| self.per_level.get(index).copied())
            .unwrap_or(0)
    }

    /// Highest level that has a damage entry.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        u8::try_from(self.per_level.len()).unwrap_or(u8::MAX)
    }

    /// Reports whether every level deals at least as much as the one before.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.per_level.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

impl Default for DamageTable {
    fn default() -> Self {
        Self::new(vec![2, 5, 9])
    }
}

/// Every tunable of the simulation engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive failed searches before a bot switches to stuck recovery.
    pub max_flood_attempts: u8,
    /// Chebyshev distance below which a tower may engage a bot.
    pub engagement_radius: u8,
    /// Number of bot slots in use, clamped to [`MAX_BOTS`].
    pub bot_capacity: usize,
    /// Number of tower slots in use, clamped to [`MAX_TOWERS`].
    pub tower_capacity: usize,
    /// Visited-node budget of a single path search.
    pub node_budget: usize,
    /// Gold available when the session starts.
    pub initial_gold: u32,
    /// Gold spent to place a tower.
    pub tower_build_cost: u32,
    /// Gold spent to raise a tower by one level.
    pub tower_upgrade_cost: u32,
    /// Damage dealt per tick for each tower level.
    pub tower_damage: DamageTable,
    /// Levels played in order.
    pub levels: Vec<LevelSpec>,
    /// Order in which bots move.
    pub schedule: MovementSchedule,
    /// Random draws attempted before stuck recovery gives up for the tick.
    pub relocation_draws: u16,
    /// Seed of the simulation random number generator.
    pub rng_seed: u64,
    /// Wall-clock time between ticks in milliseconds.
    pub tick_interval_ms: u64,
}

impl EngineConfig {
    /// Parses a configuration from TOML, filling omitted fields with defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if self.bot_capacity == 0 {
            return Err(ConfigError::NoBotCapacity);
        }
        if !self.tower_damage.is_monotonic() {
            return Err(ConfigError::NonMonotonicDamage);
        }
        if self.tower_damage.max_level() == 0 {
            return Err(ConfigError::EmptyDamageTable);
        }
        Ok(())
    }

    /// Bot capacity after clamping to the compile-time store size.
    #[must_use]
    pub fn effective_bot_capacity(&self) -> usize {
        self.bot_capacity.min(MAX_BOTS)
    }

    /// Tower capacity after clamping to the compile-time store size.
    #[must_use]
    pub fn effective_tower_capacity(&self) -> usize {
        self.tower_capacity.min(MAX_TOWERS)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_flood_attempts: 5,
            engagement_radius: 6,
            bot_capacity: MAX_BOTS,
            tower_capacity: MAX_TOWERS,
            node_budget: 120,
            initial_gold: 30_000,
            tower_build_cost: 1_500,
            tower_upgrade_cost: 2_500,
            tower_damage: DamageTable::default(),
            levels: default_levels(),
            schedule: MovementSchedule::RoundRobin,
            relocation_draws: 4_096,
            rng_seed: 0x5eed_e7d0_0000_0001,
            tick_interval_ms: 100,
        }
    }
}

fn default_levels() -> Vec<LevelSpec> {
    vec![
        LevelSpec::new("Beginners Luck", 10, 10),
        LevelSpec::new("Second Wind", 25, 15),
        LevelSpec::new("Iron Tide", 60, 25),
    ]
}

/// Reasons a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML source could not be parsed into a configuration.
    #[error("could not parse engine configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The level table was empty.
    #[error("engine configuration must declare at least one level")]
    NoLevels,
    /// The bot store was given no slots, so no wave could ever spawn.
    #[error("bot capacity must be at least one")]
    NoBotCapacity,
    /// The damage table was empty.
    #[error("tower damage table must contain at least one level")]
    EmptyDamageTable,
    /// A higher tower level dealt less damage than a lower one.
    #[error("tower damage must not decrease with level")]
    NonMonotonicDamage,
}
