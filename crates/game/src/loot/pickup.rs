use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, span, Level};
use utils::{frame::FrameClock, net_id::ActorId, rng::SimRng};

use crate::{
    character::{
        health::Health,
        movement::{Body, WorldBounds},
        player::Player,
        status::ActorState,
    },
    config::GameConfig,
    event::{FrameEvents, GameEvent},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PickupConfig {
    pub magnet_speed: f32,
    pub magnet_radius: f32,
    pub pickup_radius: f32,
    pub lifetime: f32,

    pub gravity: f32,
    /// Initial vx is uniform in `[-spawn_vx, spawn_vx]`.
    pub spawn_vx: f32,
    pub spawn_vy_min: f32,
    pub spawn_vy_max: f32,
    /// Per-update horizontal damping while airborne.
    pub air_drag: f32,
    pub bounce_vy: f32,
    pub bounce_vx: f32,
    pub settle_speed: f32,

    pub bob_amplitude: f32,
    pub bob_speed: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            magnet_speed: 900.0,
            magnet_radius: 140.0,
            pickup_radius: 22.0,
            lifetime: 12.0,

            gravity: 1200.0,
            spawn_vx: 60.0,
            spawn_vy_min: -220.0,
            spawn_vy_max: -120.0,
            air_drag: 0.98,
            bounce_vy: -0.55,
            bounce_vx: 0.6,
            settle_speed: 30.0,

            bob_amplitude: 4.0,
            bob_speed: 3.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum PickupEffect {
    Coins(u32),
    Heal(f32),
}

/// Coins collected this run.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Economy {
    pub coins: u32,
}

/// A dropped item. Falls, bounces, settles and bobs until the player comes
/// close enough to arm the magnet.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Pickup {
    pub effect: PickupEffect,
    pub position: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub base_y: f32,
    pub bob_phase: f32,
    pub magnet_active: bool,
    pub age: f32,
    pub lifetime: f32,
    pub collected: bool,
    pub remove: bool,
}

impl Pickup {
    pub fn spawn(
        effect: PickupEffect,
        position: Vec2,
        config: &PickupConfig,
        rng: &mut SimRng,
    ) -> Self {
        let vx = rng.range_f32(-config.spawn_vx, config.spawn_vx);
        let vy = rng.range_f32(config.spawn_vy_min, config.spawn_vy_max);
        let bob_phase = rng.range_f32(0.0, std::f32::consts::TAU);
        Self {
            effect,
            position,
            velocity: Vec2::new(vx, vy),
            on_ground: false,
            base_y: position.y,
            bob_phase,
            magnet_active: false,
            age: 0.0,
            lifetime: config.lifetime,
            collected: false,
            remove: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remove || self.age >= self.lifetime
    }

    /// Advance one step. `target` is the player's feet, `None` when nobody can
    /// collect. Returns `true` when the pickup reached the collection radius.
    pub fn update(
        &mut self,
        dt: f32,
        target: Option<Vec2>,
        ground_y: f32,
        config: &PickupConfig,
    ) -> bool {
        if self.collected {
            return false;
        }
        self.age += dt;

        if let Some(target) = target {
            let offset = target - self.position;
            let dist2 = offset.length_squared();
            if dist2 <= config.magnet_radius * config.magnet_radius {
                self.magnet_active = true;
            }

            if self.magnet_active {
                if dist2 <= config.pickup_radius * config.pickup_radius {
                    return true;
                }
                let step = config.magnet_speed * dt;
                let dist = dist2.sqrt();
                if dist <= step {
                    self.position = target;
                } else {
                    self.position += offset / dist * step;
                }
                return false;
            }
        }

        if !self.on_ground {
            self.velocity.y += config.gravity * dt;
            self.position += self.velocity * dt;
            self.velocity.x *= config.air_drag;

            if self.position.y >= ground_y {
                self.position.y = ground_y;
                self.velocity.y *= config.bounce_vy;
                self.velocity.x *= config.bounce_vx;

                if self.velocity.y.abs() < config.settle_speed {
                    self.velocity = Vec2::ZERO;
                    self.on_ground = true;
                    self.base_y = ground_y;
                }
            }
        }

        if self.on_ground {
            self.bob_phase += dt * config.bob_speed;
            self.position.y = self.base_y - config.bob_amplitude * self.bob_phase.sin().abs();
        }
        false
    }

    /// Mark collected and hand out the effect. Only the first call yields it.
    pub fn collect(&mut self) -> Option<PickupEffect> {
        if self.collected {
            return None;
        }
        self.collected = true;
        self.remove = true;
        Some(self.effect)
    }
}

type PickupCollector = (
    &'static ActorId,
    &'static Body,
    &'static ActorState,
    &'static mut Health,
);

pub fn pickup_update_system(
    clock: Res<FrameClock>,
    config: Res<GameConfig>,
    bounds: Res<WorldBounds>,
    mut economy: ResMut<Economy>,
    mut events: ResMut<FrameEvents>,
    mut player_query: Query<PickupCollector, With<Player>>,
    mut pickup_query: Query<(&ActorId, &mut Pickup)>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "pickup_update");
    let _enter = system_span.enter();

    let mut player = player_query.single_mut().ok();
    // A corpse attracts nothing.
    let target = player
        .as_ref()
        .filter(|(_, _, state, health)| !state.is_dead() && !health.is_dead())
        .map(|(_, body, ..)| body.position);

    let mut pickups: Vec<_> = pickup_query.iter_mut().collect();
    pickups.sort_unstable_by_key(|(id, _)| id.0);

    for (id, pickup) in pickups.iter_mut() {
        if !pickup.update(clock.delta, target, bounds.ground_y, &config.pickups) {
            continue;
        }
        let Some(effect) = pickup.collect() else {
            continue;
        };

        match effect {
            PickupEffect::Coins(value) => {
                economy.coins = economy.coins.saturating_add(value);
            }
            PickupEffect::Heal(amount) => {
                if let Some((_, _, _, health)) = player.as_mut() {
                    health.heal(amount);
                }
            }
        }

        info!(
            "sim{{f={} pickup_update collected {} effect={:?} coins={}}}",
            clock.frame, id, effect, economy.coins
        );
        events.push(GameEvent::Collected {
            id: (*id).clone(),
            effect,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;
    const GROUND: f32 = 680.0;

    fn dropped(effect: PickupEffect, at: Vec2) -> Pickup {
        let mut rng = SimRng::from_seed(4);
        Pickup::spawn(effect, at, &PickupConfig::default(), &mut rng)
    }

    #[test]
    fn spawn_velocity_is_in_range() {
        let cfg = PickupConfig::default();
        let mut rng = SimRng::from_seed(1);
        for _ in 0..200 {
            let p = Pickup::spawn(PickupEffect::Coins(1), Vec2::new(100.0, 620.0), &cfg, &mut rng);
            assert!(p.velocity.x.abs() <= 60.0);
            assert!((-220.0..=-120.0).contains(&p.velocity.y));
        }
    }

    #[test]
    fn falls_bounces_and_settles_on_the_ground() {
        let cfg = PickupConfig::default();
        let mut p = dropped(PickupEffect::Coins(2), Vec2::new(1000.0, 620.0));

        let mut frames = 0;
        while !p.on_ground && frames < 600 {
            assert!(!p.update(DT, None, GROUND, &cfg));
            assert!(p.position.y <= GROUND);
            frames += 1;
        }
        assert!(p.on_ground);
        assert_relative_eq!(p.base_y, GROUND);

        for _ in 0..120 {
            p.update(DT, None, GROUND, &cfg);
            assert!(p.position.y <= GROUND && p.position.y >= GROUND - cfg.bob_amplitude);
        }
    }

    #[test]
    fn magnet_arms_permanently_and_pulls_into_collection() {
        let cfg = PickupConfig::default();
        let mut p = dropped(PickupEffect::Coins(1), Vec2::new(1000.0, GROUND));
        let mut player = Vec2::new(1120.0, GROUND);

        assert!(!p.update(DT, Some(player), GROUND, &cfg));
        assert!(p.magnet_active);

        // Walking away does not disarm it.
        player.x = 1400.0;
        let mut collected = false;
        for _ in 0..120 {
            if p.update(DT, Some(player), GROUND, &cfg) {
                collected = true;
                break;
            }
        }
        assert!(collected);
        assert!(p.magnet_active);
    }

    #[test]
    fn out_of_range_player_is_ignored() {
        let cfg = PickupConfig::default();
        let mut p = dropped(PickupEffect::Coins(1), Vec2::new(1000.0, GROUND - 40.0));
        p.update(DT, Some(Vec2::new(2000.0, GROUND)), GROUND, &cfg);
        assert!(!p.magnet_active);
    }

    #[test]
    fn collect_yields_once() {
        let mut p = dropped(PickupEffect::Heal(2.0), Vec2::ZERO);
        assert_eq!(p.collect(), Some(PickupEffect::Heal(2.0)));
        assert!(p.collected && p.remove);
        assert_eq!(p.collect(), None);
        assert!(!p.update(DT, Some(Vec2::ZERO), GROUND, &PickupConfig::default()));
    }

    #[test]
    fn expires_after_lifetime() {
        let cfg = PickupConfig::default();
        let mut p = dropped(PickupEffect::Coins(1), Vec2::new(500.0, GROUND));
        for _ in 0..((cfg.lifetime / DT) as u32 + 2) {
            p.update(DT, None, GROUND, &cfg);
        }
        assert!(p.is_expired());
        assert!(!p.collected);
    }
}
