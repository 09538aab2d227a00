use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};

/// Horizontal drift below this speed is snapped to zero.
const DRIFT_EPSILON: f32 = 1.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub ground_y: f32,
    /// Downward acceleration; screen space, so positive y points down.
    pub gravity: f32,
    /// Multiplier applied each grounded frame to a corpse's drift.
    pub death_drift_friction: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 6000.0,
            ground_y: 680.0,
            gravity: 2600.0,
            death_drift_friction: 0.85,
        }
    }
}

/// Ground level and horizontal extent of the arena.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub ground_y: f32,
    pub width: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        (&WorldConfig::default()).into()
    }
}

impl From<&WorldConfig> for WorldBounds {
    fn from(value: &WorldConfig) -> Self {
        Self {
            ground_y: value.ground_y,
            width: value.width,
        }
    }
}

impl WorldBounds {
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(0.0, self.width.max(0.0))
    }
}

/// Feet-anchored kinematic state.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
    /// Horizontal shove from a successful block, decays linearly.
    pub pushback: f32,
    /// Horizontal slide of a corpse, decays with ground friction.
    pub drift: f32,
}

impl Body {
    pub fn grounded_at(x: f32, ground_y: f32) -> Self {
        Self {
            position: Vec2::new(x, ground_y),
            on_ground: true,
            ..Default::default()
        }
    }

    pub fn integrate_gravity(&mut self, gravity: f32, ground_y: f32, dt: f32) {
        self.velocity.y += gravity * dt;
        self.position.y += self.velocity.y * dt;

        if self.position.y >= ground_y {
            self.position.y = ground_y;
            self.velocity.y = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }
    }

    pub fn apply_pushback(&mut self, damping: f32, dt: f32) {
        if self.pushback == 0.0 {
            return;
        }
        self.position.x += self.pushback * dt;
        let decay = damping.max(0.0) * dt;
        self.pushback = if self.pushback > 0.0 {
            (self.pushback - decay).max(0.0)
        } else {
            (self.pushback + decay).min(0.0)
        };
    }

    pub fn apply_death_drift(&mut self, friction: f32, dt: f32) {
        if self.drift == 0.0 {
            return;
        }
        self.position.x += self.drift * dt;
        if self.on_ground {
            self.drift *= friction.clamp(0.0, 1.0);
        }
        if self.drift.abs() < DRIFT_EPSILON {
            self.drift = 0.0;
        }
    }
}
