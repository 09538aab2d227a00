use serde::{Deserialize, Serialize};

use crate::character::enemy::spawning::SpawnSpec;

/// Archetype pool used up to and including `max_wave`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveTier {
    pub max_wave: u32,
    pub pool: Vec<SpawnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavesConfig {
    pub break_time: f32,
    pub fight_time: f32,

    // interval_min = max(floor, start - step * (wave - 1))
    pub interval_min_start: f32,
    pub interval_min_step: f32,
    pub interval_min_floor: f32,

    pub interval_max_start: f32,
    pub interval_max_step: f32,
    pub interval_max_floor: f32,

    // max_enemies = start + per_wave * (wave - 1)
    pub max_enemies_start: u32,
    pub enemies_per_wave: u32,

    // spawn_limit = base + per_wave * (wave - 1)
    pub spawn_limit_base: u32,
    pub spawn_limit_per_wave: u32,

    pub tiers: Vec<WaveTier>,
}

impl Default for WavesConfig {
    fn default() -> Self {
        Self {
            break_time: 4.0,
            fight_time: 18.0,

            interval_min_start: 1.6,
            interval_min_step: 0.08,
            interval_min_floor: 0.45,

            interval_max_start: 2.8,
            interval_max_step: 0.10,
            interval_max_floor: 0.85,

            max_enemies_start: 6,
            enemies_per_wave: 1,

            spawn_limit_base: 4,
            spawn_limit_per_wave: 4,

            tiers: vec![
                WaveTier {
                    max_wave: 1,
                    pool: vec![SpawnSpec::new("zombie", 100)],
                },
                WaveTier {
                    max_wave: 2,
                    pool: vec![SpawnSpec::new("zombie", 80), SpawnSpec::new("ghoul", 20)],
                },
                WaveTier {
                    max_wave: u32::MAX,
                    pool: vec![SpawnSpec::new("zombie", 60), SpawnSpec::new("ghoul", 40)],
                },
            ],
        }
    }
}

impl WavesConfig {
    fn steps(wave: u32) -> f32 {
        wave.saturating_sub(1) as f32
    }

    pub fn interval_min(&self, wave: u32) -> f32 {
        let stepped = self.interval_min_start - self.interval_min_step * Self::steps(wave);
        stepped.max(self.interval_min_floor)
    }

    /// Never below `interval_min` for the same wave.
    pub fn interval_max(&self, wave: u32) -> f32 {
        (self.interval_max_start - self.interval_max_step * Self::steps(wave))
            .max(self.interval_max_floor)
            .max(self.interval_min(wave))
    }

    pub fn max_enemies(&self, wave: u32) -> u32 {
        self.max_enemies_start
            .saturating_add(self.enemies_per_wave.saturating_mul(wave.saturating_sub(1)))
    }

    pub fn spawn_limit(&self, wave: u32) -> u32 {
        self.spawn_limit_base
            .saturating_add(self.spawn_limit_per_wave.saturating_mul(wave.saturating_sub(1)))
    }

    /// First tier covering `wave`, or the last tier once all are exhausted.
    pub fn tier(&self, wave: u32) -> Option<&WaveTier> {
        self.tiers
            .iter()
            .find(|t| wave <= t.max_wave)
            .or_else(|| self.tiers.last())
    }
}
