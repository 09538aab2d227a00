use std::{collections::BTreeMap, fs, path::Path};

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    character::{
        enemy::{
            spawning::{SpawnPlacement, SpawnSpec, SpawnerConfig},
            EnemyConfig,
        },
        movement::WorldConfig,
        player::PlayerConfig,
    },
    loot::{pickup::PickupConfig, LootConfig},
    waves::WavesConfig,
    weapons::projectile::ProjectileConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
    #[error("pool '{pool}' references unknown enemy archetype '{name}'")]
    UnknownArchetype { pool: String, name: String },
}

/// All tuning for one run. Inserted once and never mutated; enemies copy
/// their own `EnemyConfig` when they spawn.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub projectile: ProjectileConfig,
    /// Archetype registry, keyed by the names spawn pools refer to.
    pub enemies: BTreeMap<String, EnemyConfig>,
    pub spawner: SpawnerConfig,
    pub waves: WavesConfig,
    pub loot: LootConfig,
    pub pickups: PickupConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut enemies = BTreeMap::new();
        enemies.insert("zombie".to_string(), EnemyConfig::zombie());
        enemies.insert("ghoul".to_string(), EnemyConfig::ghoul());

        Self {
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            projectile: ProjectileConfig::default(),
            enemies,
            spawner: SpawnerConfig::default(),
            waves: WavesConfig::default(),
            loot: LootConfig::default(),
            pickups: PickupConfig::default(),
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected > 0, got {value}")))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected >= 0, got {value}")))
    }
}

fn probability(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a probability, got {value}")))
    }
}

impl GameConfig {
    /// Parse and validate. Missing sections and fields take their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_ron_str(&source).inspect_err(|err| {
            error!("config {} rejected: {}", path.display(), err);
        })?;
        info!(
            "config loaded from {} archetypes={} tiers={}",
            path.display(),
            config.enemies.len(),
            config.waves.tiers.len()
        );
        Ok(config)
    }

    fn check_pool(&self, pool_name: &str, pool: &[SpawnSpec]) -> Result<(), ConfigError> {
        for spec in pool {
            if !self.enemies.contains_key(&spec.archetype) {
                return Err(ConfigError::UnknownArchetype {
                    pool: pool_name.to_string(),
                    name: spec.archetype.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width)?;
        non_negative("world.gravity", self.world.gravity)?;
        if !(0.0..=1.0).contains(&self.world.death_drift_friction) {
            return Err(invalid("world.death_drift_friction", "expected a factor in [0, 1]"));
        }

        positive("player.hp", self.player.hp)?;
        let player = &self.player;
        for (field, value) in [
            ("player.mana", player.mana),
            ("player.mana_drain", player.mana_drain),
            ("player.mana_regen", player.mana_regen),
            ("player.attack_windup", player.attack_windup),
            ("player.hurt_duration", player.hurt_duration),
            ("player.slow_duration", player.slow_duration),
            ("player.flash_duration", player.flash_duration),
            ("player.block.fail_stun", player.block.fail_stun),
            ("player.block.cooldown", player.block.cooldown),
            ("player.block.feedback_duration", player.block.feedback_duration),
        ] {
            non_negative(field, value)?;
        }
        probability("player.block.chance", player.block.chance)?;
        non_negative("projectile.damage", self.projectile.damage)?;

        positive("projectile.speed", self.projectile.speed)?;
        positive("projectile.lifetime", self.projectile.lifetime)?;

        if self.enemies.is_empty() {
            return Err(invalid("enemies", "registry is empty"));
        }
        for (name, enemy) in &self.enemies {
            positive(&format!("enemies.{name}.hp"), enemy.hp)?;
            for (field, value) in [
                ("attack_damage", enemy.attack_damage),
                ("attack_range", enemy.attack_range),
                ("attack_cooldown", enemy.attack_cooldown),
                ("parry_stun", enemy.parry_stun),
                ("parry_cooldown", enemy.parry_cooldown),
                ("slow_duration", enemy.slow_duration),
                ("hurt_duration", enemy.hurt_duration),
                ("flash_duration", enemy.flash_duration),
                ("death_linger", enemy.death_linger),
                ("death_fade_time", enemy.death_fade_time),
            ] {
                non_negative(&format!("enemies.{name}.{field}"), value)?;
            }
        }

        non_negative("spawner.interval_min", self.spawner.interval_min)?;
        if self.spawner.interval_max < self.spawner.interval_min {
            return Err(invalid("spawner.interval_max", "below spawner.interval_min"));
        }
        if let SpawnPlacement::Ranged { behind_chance, .. } = self.spawner.placement {
            probability("spawner.placement.behind_chance", behind_chance)?;
        }
        self.check_pool("spawner.pool", &self.spawner.pool)?;

        positive("waves.break_time", self.waves.break_time)?;
        positive("waves.fight_time", self.waves.fight_time)?;
        non_negative("waves.interval_min_floor", self.waves.interval_min_floor)?;
        if self.waves.tiers.is_empty() {
            return Err(invalid("waves.tiers", "at least one tier is required"));
        }
        for tier in &self.waves.tiers {
            self.check_pool(&format!("waves.tiers[{}]", tier.max_wave), &tier.pool)?;
        }

        probability("loot.heal_chance", self.loot.heal_chance)?;
        non_negative("pickups.pickup_radius", self.pickups.pickup_radius)?;
        if self.pickups.magnet_radius < self.pickups.pickup_radius {
            return Err(invalid("pickups.magnet_radius", "below pickups.pickup_radius"));
        }
        Ok(())
    }
}
