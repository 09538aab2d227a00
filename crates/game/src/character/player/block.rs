use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::character::timers::{TimerKind, TimerSet};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BlockConfig {
    /// Probability in `[0, 1]` that a blocked hit is fully negated.
    pub chance: f32,
    /// Extra stun when the roll fails.
    pub fail_stun: f32,
    /// Guard lockout after a failed block.
    pub cooldown: f32,
    pub pushback_force: f32,
    pub feedback_duration: f32,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            chance: 0.8,
            fail_stun: 0.4,
            cooldown: 1.0,
            pushback_force: 300.0,
            feedback_duration: 0.18,
        }
    }
}

/// Player shield. `raised` mirrors the block intent, dropped while the guard
/// is on cooldown even if the intent is still held.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Guard {
    pub raised: bool,
    pub config: BlockConfig,
}

impl Guard {
    pub fn new(config: BlockConfig) -> Self {
        Self {
            raised: false,
            config,
        }
    }

    pub fn update(&mut self, block_held: bool, timers: &TimerSet) {
        self.raised = block_held && !timers.is_active(TimerKind::BlockCooldown);
    }
}
