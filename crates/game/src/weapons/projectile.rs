use animation::FacingDirection;
use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, span, Level};
use utils::{frame::FrameClock, net_id::ActorId, rng::SimRng};

use crate::{
    character::{
        enemy::Enemy,
        health::{apply_damage, Defender, Health, HitReactions},
        movement::Body,
        status::ActorState,
        timers::TimerSet,
    },
    collider::{Aabb, Collider},
    event::{CombatEvent, FrameEvents, GameEvent},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub half_extents: (f32, f32),
    /// Horizontal spawn offset in front of the shooter.
    pub muzzle_offset: f32,
    /// Spawn height above the shooter's feet.
    pub muzzle_height: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 650.0,
            lifetime: 1.5,
            damage: 1.0,
            half_extents: (18.0, 12.0),
            muzzle_offset: 30.0,
            muzzle_height: 70.0,
        }
    }
}

/// Straight-flying shot. Hits at most one target, then expires.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub owner: ActorId,
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
    pub damage: f32,
    pub half_extents: Vec2,
    pub age: f32,
    pub lifetime: f32,
}

impl Projectile {
    pub fn launch(
        owner: ActorId,
        config: &ProjectileConfig,
        feet: Vec2,
        facing: FacingDirection,
    ) -> Self {
        let direction = facing.sign();
        Self {
            owner,
            position: Vec2::new(
                feet.x + config.muzzle_offset * direction,
                feet.y - config.muzzle_height,
            ),
            direction,
            speed: config.speed,
            damage: config.damage,
            half_extents: Vec2::new(config.half_extents.0, config.half_extents.1),
            age: 0.0,
            lifetime: config.lifetime,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.position.x += self.speed * self.direction * dt;
        self.age += dt;
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    pub fn expire(&mut self) {
        self.age = self.age.max(self.lifetime);
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }
}

pub fn projectile_movement_system(clock: Res<FrameClock>, mut query: Query<&mut Projectile>) {
    for mut projectile in query.iter_mut() {
        projectile.advance(clock.delta);
    }
}

type TargetParts = (
    Entity,
    &'static ActorId,
    &'static mut ActorState,
    &'static mut Health,
    &'static mut TimerSet,
    &'static mut Body,
    &'static HitReactions,
    &'static FacingDirection,
    &'static Collider,
);

/// Pairwise projectile/enemy overlap test. Corpses are skipped, they are
/// still around this frame but no longer valid targets.
pub fn projectile_collision_system(
    clock: Res<FrameClock>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<FrameEvents>,
    mut projectile_query: Query<(&ActorId, &mut Projectile)>,
    mut enemy_query: Query<TargetParts, With<Enemy>>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "projectile_collisions");
    let _enter = system_span.enter();

    let mut projectiles: Vec<_> = projectile_query.iter_mut().collect();
    projectiles.sort_unstable_by_key(|(id, _)| id.0);

    let mut targets: Vec<_> = enemy_query.iter_mut().collect();
    targets.sort_unstable_by_key(|(_, id, ..)| id.0);

    for (projectile_id, projectile) in projectiles.iter_mut() {
        if projectile.is_expired() {
            continue;
        }
        let shot = projectile.aabb();

        for (_, id, state, health, timers, body, reactions, facing, collider) in targets.iter_mut()
        {
            if state.is_dead() || !collider.aabb_at_feet(body.position).overlaps(&shot) {
                continue;
            }

            let mut defender = Defender {
                id,
                state,
                health,
                timers,
                body,
                reactions,
                facing: **facing,
                guard: None,
            };
            let outcome =
                apply_damage(&mut defender, projectile.damage, projectile.position.x, &mut rng);
            projectile.expire();

            info!(
                "sim{{f={} projectile_collisions {} hit {} outcome={:?} hp={}}}",
                clock.frame, projectile_id, id, outcome, health.current
            );
            events.push(GameEvent::Combat(CombatEvent {
                attacker: projectile.owner.clone(),
                defender: (*id).clone(),
                amount: projectile.damage,
                outcome,
            }));
            if state.is_dead() {
                events.push(GameEvent::Died { id: (*id).clone() });
            }
            break;
        }
    }
}
