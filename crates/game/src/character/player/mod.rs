pub mod block;
pub mod input;
pub mod mana;

use animation::{AnimationState, Clip, ClipSet, ClipSpec, FacingDirection};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, Level};
use utils::{
    frame::FrameClock,
    net_id::{ActorId, ActorIdFactory},
};

use crate::{
    character::{
        enemy::Enemy,
        health::{Health, HitReactions},
        movement::{Body, WorldBounds},
        status::{resolve_status, ActorState, Role, Status, StatusInputs},
        timers::{TimerKind, TimerSet},
        VisualHints,
    },
    collider::Collider,
    config::GameConfig,
    event::{FrameEvents, GameEvent},
    weapons::{
        melee::AttackState,
        projectile::{Projectile, ProjectileConfig},
    },
};

use block::{BlockConfig, Guard};
use input::PlayerIntents;
use mana::Mana;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub hp: f32,
    pub mana: f32,
    pub mana_drain: f32,
    pub mana_regen: f32,

    pub speed: f32,
    pub sprint_speed: f32,
    /// Horizontal speed multiplier while airborne.
    pub air_control: f32,
    pub jump_strength: f32,

    /// Delay between the attack press and the projectile leaving.
    pub attack_windup: f32,

    pub hurt_duration: f32,
    pub slow_duration: f32,
    pub slow_multiplier: f32,
    pub flash_duration: f32,
    pub death_knockback: f32,
    pub pushback_damping: f32,

    pub start_x: f32,
    pub collider: (f32, f32),
    pub block: BlockConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            hp: 10.0,
            mana: 10.0,
            mana_drain: 6.0,
            mana_regen: 2.0,
            speed: 250.0,
            sprint_speed: 420.0,
            air_control: 1.6,
            jump_strength: 950.0,
            attack_windup: 0.45,
            hurt_duration: 0.25,
            slow_duration: 0.35,
            slow_multiplier: 0.4,
            flash_duration: 0.2,
            death_knockback: 260.0,
            pushback_damping: 1200.0,
            start_x: 640.0,
            collider: (24.0, 60.0),
            block: BlockConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn hit_reactions(&self) -> HitReactions {
        HitReactions {
            hurt_duration: self.hurt_duration,
            slow_duration: self.slow_duration,
            flash_duration: self.flash_duration,
            death_linger: 0.0,
            death_knockback: self.death_knockback,
        }
    }

    /// Horizontal speed for this frame.
    pub fn move_speed(&self, sprinting: bool, slowed: bool, airborne: bool) -> f32 {
        let base = if sprinting { self.sprint_speed } else { self.speed };
        let slow = if slowed { self.slow_multiplier } else { 1.0 };
        let air = if airborne { self.air_control } else { 1.0 };
        base * slow * air
    }
}

pub fn player_clip_set() -> ClipSet {
    ClipSet::new(12.0)
        .with(Clip::Idle, ClipSpec::looped(9))
        .with(Clip::Walk, ClipSpec::looped(12))
        .with(Clip::Run, ClipSpec::looped(12))
        .with(Clip::Attack, ClipSpec::once(8))
        .with(Clip::Protect, ClipSpec::once(4))
        .with(Clip::Dead, ClipSpec::once(5))
        .with(Clip::Hurt, ClipSpec::looped(3))
        .with(Clip::Jump, ClipSpec::once(15))
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Player {
    /// Last frame's intents, for press edges.
    pub previous: PlayerIntents,
    /// The jump clip plays out fully and until landing.
    pub jump_lock: bool,
}

pub fn player_bundle(id: ActorId, config: &PlayerConfig, ground_y: f32) -> impl Bundle {
    let (half_width, half_height) = config.collider;
    (
        (
            id,
            Player::default(),
            ActorState::Idle,
            Health::new(config.hp),
            TimerSet::default(),
            config.hit_reactions(),
            Guard::new(config.block.clone()),
            Mana::new(config.mana, config.mana_drain, config.mana_regen),
        ),
        (
            Body::grounded_at(config.start_x, ground_y),
            FacingDirection::Right,
            AttackState::default(),
            AnimationState::default(),
            player_clip_set(),
            VisualHints::default(),
            Collider::new(half_width, half_height),
        ),
    )
}

type PlayerParts = (
    &'static ActorId,
    &'static mut Player,
    &'static mut ActorState,
    &'static Health,
    &'static mut TimerSet,
    &'static mut Body,
    &'static mut FacingDirection,
    &'static mut AttackState,
    &'static mut AnimationState,
    &'static mut Guard,
    &'static mut Mana,
);

pub fn player_update_system(
    mut commands: Commands,
    clock: Res<FrameClock>,
    config: Res<GameConfig>,
    bounds: Res<WorldBounds>,
    intents: Res<PlayerIntents>,
    mut id_factory: ResMut<ActorIdFactory>,
    mut events: ResMut<FrameEvents>,
    mut query: Query<PlayerParts, Without<Enemy>>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "player_update");
    let _enter = system_span.enter();

    let Ok((
        id,
        mut player,
        mut state,
        health,
        mut timers,
        mut body,
        mut facing,
        mut attack,
        mut anim,
        mut guard,
        mut mana,
    )) = query.single_mut()
    else {
        return;
    };

    let dt = clock.delta;
    let cfg = &config.player;

    timers.tick(dt);
    guard.update(intents.block, &timers);
    let edges = intents.edges(&mut player.previous);

    let dead = state.is_dead() || health.is_dead();
    let hurt_or_stunned = timers.is_active(TimerKind::Hurt) || timers.is_active(TimerKind::Stun);

    let can_jump = body.on_ground && !attack.active && !guard.raised;
    if edges.jump && can_jump && !hurt_or_stunned && !dead {
        body.velocity.y = -cfg.jump_strength;
        body.on_ground = false;
        player.jump_lock = true;
        anim.restart(Clip::Jump);
        debug!("sim{{f={} player_update {} jump}}", clock.frame, id);
    }

    body.integrate_gravity(config.world.gravity, bounds.ground_y, dt);
    body.apply_pushback(cfg.pushback_damping, dt);
    body.apply_death_drift(config.world.death_drift_friction, dt);
    body.position.x = bounds.clamp_x(body.position.x);

    let status = resolve_status(StatusInputs::from_timers(
        Role::Player,
        dead,
        attack.active,
        guard.raised,
        &timers,
    ));

    match status {
        Status::Dead => {
            player.jump_lock = false;
            state.enter(ActorState::Dead);
            anim.play(Clip::Dead);
        }
        Status::Stunned | Status::Hurting => {
            if attack.active {
                attack.cancel();
            }
            player.jump_lock = false;
            state.enter(ActorState::Hurt);
            anim.play(Clip::Hurt);
        }
        Status::Attacking => {
            mana.update(dt, false, false);
            attack.elapsed += dt;

            if attack.elapsed >= cfg.attack_windup && !attack.hit_applied {
                attack.hit_applied = true;
                let projectile_id = fire_projectile(
                    &mut commands,
                    &mut id_factory,
                    id,
                    &config.projectile,
                    &body,
                    *facing,
                );
                info!(
                    "sim{{f={} player_update {} fired {} dir={}}}",
                    clock.frame,
                    id,
                    projectile_id,
                    facing.to_int()
                );
                events.push(GameEvent::ProjectileFired {
                    owner: id.clone(),
                    id: projectile_id,
                    x: body.position.x,
                    direction: facing.to_int(),
                });
            }

            if anim.is_finished() {
                attack.finish();
                state.enter(ActorState::Idle);
                anim.play(Clip::Idle);
            }
        }
        Status::Blocking => {
            mana.update(dt, false, false);
            state.enter(ActorState::Protect);
            anim.play(Clip::Protect);
        }
        Status::Free => {
            let direction = intents.horizontal();
            let moving = direction != 0.0;
            let sprinting = intents.sprint && mana.can_sprint();

            if moving {
                let slowed = timers.is_active(TimerKind::Slow);
                let speed = cfg.move_speed(sprinting, slowed, !body.on_ground);
                body.position.x = bounds.clamp_x(body.position.x + direction * speed * dt);
                if let Some(toward) = FacingDirection::from_dx(direction) {
                    *facing = toward;
                }
            }
            mana.update(dt, sprinting, moving);

            if edges.attack {
                state.enter(ActorState::Attack);
                attack.start();
                anim.restart(Clip::Attack);
                debug!("sim{{f={} player_update {} attack_start}}", clock.frame, id);
            } else if player.jump_lock {
                state.enter(ActorState::Jump);
                anim.play(Clip::Jump);
                if anim.is_finished() && body.on_ground {
                    player.jump_lock = false;
                }
            } else if !body.on_ground {
                state.enter(ActorState::Jump);
                anim.play(Clip::Jump);
            } else if moving {
                let next = if sprinting { ActorState::Run } else { ActorState::Walk };
                state.enter(next);
                anim.play(next.clip());
            } else {
                state.enter(ActorState::Idle);
                anim.play(Clip::Idle);
            }
        }
    }
}

fn fire_projectile(
    commands: &mut Commands,
    id_factory: &mut ActorIdFactory,
    owner: &ActorId,
    config: &ProjectileConfig,
    body: &Body,
    facing: FacingDirection,
) -> ActorId {
    let id = id_factory.next("book");
    let projectile = Projectile::launch(owner.clone(), config, body.position, facing);
    commands.spawn((id.clone(), projectile));
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn move_speed_stacks_multipliers() {
        let cfg = PlayerConfig::default();
        assert_relative_eq!(cfg.move_speed(false, false, false), 250.0);
        assert_relative_eq!(cfg.move_speed(true, false, false), 420.0);
        assert_relative_eq!(cfg.move_speed(false, true, false), 100.0);
        assert_relative_eq!(cfg.move_speed(false, false, true), 400.0);
        assert_relative_eq!(cfg.move_speed(true, true, true), 420.0 * 0.4 * 1.6);
    }

    #[test]
    fn attack_clip_outlasts_windup() {
        let cfg = PlayerConfig::default();
        let attack = player_clip_set().duration(Clip::Attack).unwrap();
        assert!(attack > cfg.attack_windup);
    }
}
