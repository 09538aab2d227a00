pub mod enemy;
pub mod health;
pub mod movement;
pub mod player;
pub mod status;
pub mod timers;

use bevy_ecs::prelude::*;
use serde::Serialize;

use self::{
    enemy::Enemy,
    status::ActorState,
    timers::{TimerKind, TimerSet},
};

/// Render hints for one actor. The simulation never produces pixels, only
/// these values.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualHints {
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    pub desaturate: bool,
    pub damage_flash: bool,
    pub block_feedback: bool,
}

impl Default for VisualHints {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            desaturate: false,
            damage_flash: false,
            block_feedback: false,
        }
    }
}

pub fn update_visual_hints_system(
    mut query: Query<(&TimerSet, &ActorState, &mut VisualHints, Option<&Enemy>)>,
) {
    for (timers, state, mut hints, enemy) in query.iter_mut() {
        hints.damage_flash = timers.is_active(TimerKind::DamageFlash);
        hints.block_feedback = timers.is_active(TimerKind::BlockFeedback);
        hints.desaturate = *state == ActorState::Stunned;
        hints.alpha = enemy.map_or(1.0, |e| e.alpha(timers));
    }
}
