use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, span, warn, Level};
use utils::{frame::FrameClock, net_id::ActorIdFactory, rng::SimRng};

use crate::{
    character::{
        movement::{Body, WorldBounds},
        player::Player,
        status::ActorState,
    },
    config::GameConfig,
    event::{FrameEvents, GameEvent},
    waves::state::WaveState,
};

use super::{create::spawn_enemy, Enemy, EnemyConfig};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    /// Key into the enemy registry.
    pub archetype: String,
    pub weight: u32,
}

impl SpawnSpec {
    pub fn new(archetype: impl Into<String>, weight: u32) -> Self {
        Self {
            archetype: archetype.into(),
            weight,
        }
    }
}

/// Where new enemies appear relative to the player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SpawnPlacement {
    /// Fixed offset to a random side.
    Pad { distance: f32 },
    /// Random distance ahead (+x), sometimes behind.
    Ranged {
        ahead_min: f32,
        ahead_max: f32,
        behind_chance: f32,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnerConfig {
    pub interval_min: f32,
    pub interval_max: f32,
    pub max_enemies: u32,
    pub min_dist_from_player: f32,
    pub placement: SpawnPlacement,
    /// Pool used until the wave scheduler installs a tier pool.
    pub pool: Vec<SpawnSpec>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_min: 1.2,
            interval_max: 2.5,
            max_enemies: 6,
            min_dist_from_player: 250.0,
            placement: SpawnPlacement::Ranged {
                ahead_min: 400.0,
                ahead_max: 900.0,
                behind_chance: 0.2,
            },
            pool: vec![SpawnSpec::new("zombie", 70), SpawnSpec::new("ghoul", 30)],
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("spawn pool is empty or has zero total weight")]
    EmptyPool,
    #[error("unknown enemy archetype '{0}'")]
    UnknownArchetype(String),
}

/// Chosen archetype and position, ready to be turned into an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPlan {
    pub name: String,
    pub config: EnemyConfig,
    pub x: f32,
}

/// Countdown, cap and pool of the enemy spawner. The live parameters are
/// rewritten by the wave scheduler every tick once the first wave started.
#[derive(Resource, Debug, Clone)]
pub struct Spawner {
    pub config: SpawnerConfig,
    pub interval_min: f32,
    pub interval_max: f32,
    pub max_enemies: u32,
    pub pool: Vec<SpawnSpec>,
    pub timer: f32,
    pub next_spawn: f32,
}

impl Spawner {
    pub fn new(config: SpawnerConfig, rng: &mut SimRng) -> Self {
        let mut spawner = Self {
            interval_min: config.interval_min,
            interval_max: config.interval_max,
            max_enemies: config.max_enemies,
            pool: config.pool.clone(),
            timer: 0.0,
            next_spawn: 0.0,
            config,
        };
        spawner.reset(rng);
        spawner
    }

    pub fn reset(&mut self, rng: &mut SimRng) {
        self.interval_min = self.config.interval_min;
        self.interval_max = self.config.interval_max;
        self.max_enemies = self.config.max_enemies;
        self.pool = self.config.pool.clone();
        self.timer = 0.0;
        self.next_spawn = rng.range_f32(self.interval_min, self.interval_max);
    }

    /// Advance the countdown. Returns `true` when a spawn is due. While the
    /// cap is reached the countdown is frozen.
    pub fn tick(&mut self, dt: f32, alive: u32, rng: &mut SimRng) -> bool {
        if alive >= self.max_enemies {
            return false;
        }

        self.timer += dt.max(0.0);
        if self.timer < self.next_spawn {
            return false;
        }

        self.timer = 0.0;
        self.next_spawn = rng.range_f32(self.interval_min, self.interval_max);
        true
    }

    /// Weighted draw over the current pool.
    pub fn pick_archetype(&self, rng: &mut SimRng) -> Result<&str, SpawnError> {
        let total: u32 = self.pool.iter().map(|s| s.weight).sum();
        if total == 0 {
            return Err(SpawnError::EmptyPool);
        }

        let mut roll = rng.next_u32_range(0, total);
        for spec in &self.pool {
            if roll < spec.weight {
                return Ok(&spec.archetype);
            }
            roll -= spec.weight;
        }
        Err(SpawnError::EmptyPool)
    }

    pub fn pick_spawn_x(&self, player_x: f32, bounds: &WorldBounds, rng: &mut SimRng) -> f32 {
        let x = match &self.config.placement {
            SpawnPlacement::Pad { distance } => {
                if rng.chance(0.5) {
                    player_x - distance
                } else {
                    player_x + distance
                }
            }
            SpawnPlacement::Ranged {
                ahead_min,
                ahead_max,
                behind_chance,
            } => {
                let behind = rng.chance(*behind_chance);
                let dx = rng.range_f32(*ahead_min, *ahead_max);
                if behind {
                    player_x - dx
                } else {
                    player_x + dx
                }
            }
        };

        keep_distance(bounds.clamp_x(x), player_x, self.config.min_dist_from_player, bounds)
    }

    /// Pick an archetype, resolve it against the registry and place it.
    pub fn spawn_one(
        &self,
        rng: &mut SimRng,
        player_x: f32,
        bounds: &WorldBounds,
        registry: &BTreeMap<String, EnemyConfig>,
    ) -> Result<SpawnPlan, SpawnError> {
        let name = self.pick_archetype(rng)?;
        let config = registry
            .get(name)
            .ok_or_else(|| SpawnError::UnknownArchetype(name.to_string()))?;
        let x = self.pick_spawn_x(player_x, bounds, rng);

        Ok(SpawnPlan {
            name: name.to_string(),
            config: config.clone(),
            x,
        })
    }
}

/// Push `x` out to `min_dist` from the player on the same side; flip sides
/// when the world edge eats the margin.
fn keep_distance(x: f32, player_x: f32, min_dist: f32, bounds: &WorldBounds) -> f32 {
    if (x - player_x).abs() >= min_dist {
        return x;
    }

    let side = if x >= player_x { 1.0 } else { -1.0 };
    let pushed = bounds.clamp_x(player_x + side * min_dist);
    if (pushed - player_x).abs() >= min_dist {
        return pushed;
    }

    let flipped = bounds.clamp_x(player_x - side * min_dist);
    if (flipped - player_x).abs() < min_dist {
        warn!(
            "world too narrow to keep {} away from player at {:.1}, spawning at {:.1}",
            min_dist, player_x, flipped
        );
    }
    flipped
}

pub fn enemy_spawning_system(
    mut commands: Commands,
    clock: Res<FrameClock>,
    config: Res<GameConfig>,
    bounds: Res<WorldBounds>,
    mut spawner: ResMut<Spawner>,
    mut wave_state: ResMut<WaveState>,
    mut rng: ResMut<SimRng>,
    mut id_factory: ResMut<ActorIdFactory>,
    mut events: ResMut<FrameEvents>,
    player_query: Query<(&Body, &ActorState), With<Player>>,
    enemy_query: Query<&ActorState, With<Enemy>>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "enemy_spawning");
    let _enter = system_span.enter();

    let Ok((player_body, player_state)) = player_query.single() else {
        return;
    };
    if player_state.is_dead() || !wave_state.can_spawn() {
        return;
    }

    let alive = enemy_query.iter().filter(|s| !s.is_dead()).count() as u32;
    if !spawner.tick(clock.delta, alive, &mut rng) {
        return;
    }

    match spawner.spawn_one(&mut rng, player_body.position.x, &bounds, &config.enemies) {
        Ok(plan) => {
            let id = spawn_enemy(
                &mut commands,
                &mut id_factory,
                &plan.name,
                &plan.config,
                plan.x,
                bounds.ground_y,
            );
            wave_state.on_spawned(1);
            info!(
                "sim{{f={} enemy_spawning id={} x={:.1} alive={} wave={} spawned={}/{}}}",
                clock.frame,
                id,
                plan.x,
                alive + 1,
                wave_state.wave,
                wave_state.spawned_this_wave,
                wave_state.spawn_limit
            );
            events.push(GameEvent::Spawned {
                id,
                archetype: plan.name,
                x: plan.x,
            });
        }
        Err(err) => {
            error!("sim{{f={} enemy_spawning failed: {}}}", clock.frame, err);
            events.push(GameEvent::SpawnFailed {
                reason: err.to_string(),
            });
        }
    }
}
