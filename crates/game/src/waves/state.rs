use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::character::enemy::spawning::Spawner;

use super::config::WavesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WavePhase {
    /// Breather between fights; nothing spawns.
    #[default]
    Break,
    /// Enemies spawn until the wave's spawn limit is reached.
    Fight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveTransition {
    pub wave: u32,
    pub from: WavePhase,
    pub to: WavePhase,
}

/// Break/Fight scheduler state.
#[derive(Resource, Debug, Clone)]
pub struct WaveState {
    pub config: WavesConfig,
    /// 0 before the first fight, then 1-indexed.
    pub wave: u32,
    pub phase: WavePhase,
    /// Seconds left in the current phase.
    pub timer: f32,
    pub spawned_this_wave: u32,
    pub spawn_limit: u32,
}

impl WaveState {
    pub fn new(config: WavesConfig) -> Self {
        let mut state = Self {
            config,
            wave: 0,
            phase: WavePhase::Break,
            timer: 0.0,
            spawned_this_wave: 0,
            spawn_limit: 0,
        };
        state.start();
        state
    }

    /// Back to wave 0 at the start of a break.
    pub fn start(&mut self) {
        self.wave = 0;
        self.spawned_this_wave = 0;
        self.spawn_limit = 0;
        self.start_break();
    }

    pub fn is_fight(&self) -> bool {
        self.phase == WavePhase::Fight
    }

    pub fn can_spawn(&self) -> bool {
        self.is_fight() && self.spawned_this_wave < self.spawn_limit
    }

    pub fn on_spawned(&mut self, count: u32) {
        self.spawned_this_wave = self.spawned_this_wave.saturating_add(count);
    }

    /// Not-yet-spawned enemies of this wave plus the ones still alive.
    pub fn enemies_left(&self, live: u32) -> u32 {
        self.spawn_limit.saturating_sub(self.spawned_this_wave) + live
    }

    fn start_fight(&mut self) {
        self.wave += 1;
        self.phase = WavePhase::Fight;
        self.timer = self.config.fight_time;
        self.spawned_this_wave = 0;
        self.spawn_limit = self.config.spawn_limit(self.wave);
    }

    fn start_break(&mut self) {
        self.phase = WavePhase::Break;
        self.timer = self.config.break_time;
    }

    /// Rewrite the spawner for the current wave.
    pub fn apply_to_spawner(&self, spawner: &mut Spawner) {
        let w = self.wave;
        spawner.interval_min = self.config.interval_min(w);
        spawner.interval_max = self.config.interval_max(w);
        spawner.max_enemies = self.config.max_enemies(w);
        if let Some(tier) = self.config.tier(w) {
            if spawner.pool != tier.pool {
                spawner.pool = tier.pool.clone();
            }
        }
    }

    pub fn update(&mut self, dt: f32, spawner: &mut Spawner) -> Option<WaveTransition> {
        self.timer -= dt.max(0.0);

        let mut transition = None;
        if self.timer <= 0.0 {
            let from = self.phase;
            match self.phase {
                WavePhase::Break => self.start_fight(),
                WavePhase::Fight => self.start_break(),
            }
            transition = Some(WaveTransition {
                wave: self.wave,
                from,
                to: self.phase,
            });
        }

        if self.wave > 0 {
            self.apply_to_spawner(spawner);
        }

        transition
    }
}
