use animation::{AnimationState, Clip, FacingDirection};
use bevy_ecs::prelude::*;
use tracing::{debug, info, span, trace, Level};
use utils::{frame::FrameClock, net_id::ActorId, rng::SimRng};

use crate::{
    character::{
        health::{DamageOutcome, Defender, Health, HitReactions},
        movement::{Body, WorldBounds},
        player::{block::Guard, Player},
        status::{resolve_status, ActorState, Role, Status, StatusInputs},
        timers::{TimerKind, TimerSet},
    },
    config::GameConfig,
    event::{CombatEvent, FrameEvents, GameEvent},
    weapons::melee::{resolve_attack, AttackState, Attacker},
};

use super::{CorpseEvent, Enemy};

/// What a free enemy does this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    Attack { facing: FacingDirection },
    Chase { direction: f32 },
    Idle,
}

/// One-dimensional pursuit. `dx` is player x minus enemy x.
pub fn decide(dx: f32, attack_range: f32, cooldown_active: bool, chase_epsilon: f32) -> AiDecision {
    let distance = dx.abs();
    if distance <= attack_range && !cooldown_active {
        let facing = if dx > 0.0 {
            FacingDirection::Right
        } else {
            FacingDirection::Left
        };
        return AiDecision::Attack { facing };
    }
    if distance > chase_epsilon {
        return AiDecision::Chase {
            direction: dx.signum(),
        };
    }
    AiDecision::Idle
}

type PlayerTarget = (
    &'static ActorId,
    &'static mut ActorState,
    &'static mut Health,
    &'static mut TimerSet,
    &'static mut Body,
    &'static HitReactions,
    &'static FacingDirection,
    &'static Guard,
);

type EnemyParts = (
    &'static ActorId,
    &'static mut Enemy,
    &'static mut ActorState,
    &'static mut TimerSet,
    &'static mut Body,
    &'static mut FacingDirection,
    &'static mut AttackState,
    &'static mut AnimationState,
);

pub fn enemy_update_system(
    clock: Res<FrameClock>,
    config: Res<GameConfig>,
    bounds: Res<WorldBounds>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<FrameEvents>,
    mut player_query: Query<PlayerTarget, (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<(Entity, EnemyParts), Without<Player>>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "enemy_update");
    let _enter = system_span.enter();

    let dt = clock.delta;
    let Ok((
        player_id,
        mut p_state,
        mut p_health,
        mut p_timers,
        mut p_body,
        p_reactions,
        p_facing,
        p_guard,
    )) = player_query.single_mut()
    else {
        return;
    };

    let mut order: Vec<(u32, Entity)> = enemy_query
        .iter()
        .map(|(entity, (id, ..))| (id.0, entity))
        .collect();
    order.sort_unstable_by_key(|(id, _)| *id);

    for (_, entity) in order {
        let Ok((
            _,
            (id, mut enemy, mut state, mut timers, mut body, mut facing, mut attack, mut anim),
        )) = enemy_query.get_mut(entity)
        else {
            continue;
        };

        let expired = timers.tick(dt);
        if !expired.is_empty() {
            let expired: Vec<_> = expired.iter().collect();
            trace!("sim{{f={} {} expired={:?}}}", clock.frame, id, expired);
        }

        body.integrate_gravity(config.world.gravity, bounds.ground_y, dt);
        body.apply_death_drift(config.world.death_drift_friction, dt);
        body.position.x = bounds.clamp_x(body.position.x);

        anim.playback_rate = 1.0;

        let status = resolve_status(StatusInputs::from_timers(
            Role::Enemy,
            state.is_dead(),
            attack.active,
            false,
            &timers,
        ));

        match status {
            Status::Dead => {
                state.enter(ActorState::Dead);
                anim.play(Clip::Dead);
                match enemy.update_corpse(&mut timers) {
                    Some(CorpseEvent::FadeStarted) => {
                        debug!("sim{{f={} enemy_update {} fade_started}}", clock.frame, id)
                    }
                    Some(CorpseEvent::Removed) => {
                        info!("sim{{f={} enemy_update {} corpse_removed}}", clock.frame, id)
                    }
                    None => {}
                }
            }
            Status::Stunned => {
                if attack.active {
                    attack.cancel();
                }
                state.enter(ActorState::Stunned);
                anim.play(Clip::Hurt);
                anim.playback_rate = enemy.config.stun_anim_speed;
            }
            Status::Hurting => {
                if attack.active {
                    attack.cancel();
                }
                state.enter(ActorState::Hurt);
                anim.play(Clip::Hurt);
            }
            Status::Attacking => {
                attack.elapsed += dt;

                let profile = enemy.profile.clone();
                let player_was_alive = !p_state.is_dead();
                let mut attacker = Attacker {
                    id,
                    position_x: body.position.x,
                    profile: &profile,
                    attack: &mut attack,
                    timers: &mut timers,
                    state: &mut state,
                };
                let mut defender = Defender {
                    id: player_id,
                    state: &mut p_state,
                    health: &mut p_health,
                    timers: &mut p_timers,
                    body: &mut p_body,
                    reactions: p_reactions,
                    facing: *p_facing,
                    guard: Some(p_guard),
                };

                if let Some(resolution) = resolve_attack(&mut attacker, &mut defender, &mut rng) {
                    if let Some(outcome) = resolution.outcome.filter(|_| player_was_alive) {
                        info!(
                            "sim{{f={} enemy_attack attacker={} defender={} outcome={:?} hp={}}}",
                            clock.frame, id, player_id, outcome, p_health.current
                        );
                        events.push(GameEvent::Combat(CombatEvent {
                            attacker: id.clone(),
                            defender: player_id.clone(),
                            amount: if outcome == DamageOutcome::BlockedSuccess {
                                0.0
                            } else {
                                profile.damage
                            },
                            outcome,
                        }));
                        if p_state.is_dead() {
                            events.push(GameEvent::Died {
                                id: player_id.clone(),
                            });
                        }
                    }
                    if resolution.parried {
                        anim.restart(Clip::Hurt);
                        anim.playback_rate = enemy.config.stun_anim_speed;
                        continue;
                    }
                }

                if anim.is_finished() {
                    attack.finish();
                    state.enter(ActorState::Idle);
                    anim.play(Clip::Idle);
                }
            }
            Status::Blocking | Status::Free => {
                let dx = p_body.position.x - body.position.x;
                let cfg = &enemy.config;
                let cooling = timers.is_active(TimerKind::AttackCooldown);
                match decide(dx, cfg.attack_range, cooling, cfg.chase_epsilon) {
                    AiDecision::Attack { facing: toward } => {
                        *facing = toward;
                        state.enter(ActorState::Attack);
                        attack.start();
                        anim.restart(Clip::Attack);
                        timers.arm(TimerKind::AttackCooldown, cfg.attack_cooldown);
                        debug!(
                            "sim{{f={} enemy_update {} attack_start dx={:.1}}}",
                            clock.frame, id, dx
                        );
                    }
                    AiDecision::Chase { direction } => {
                        let slow = if timers.is_active(TimerKind::Slow) {
                            cfg.slow_multiplier
                        } else {
                            1.0
                        };
                        let step = cfg.speed * slow * direction * dt;
                        body.position.x = bounds.clamp_x(body.position.x + step);
                        if let Some(toward) = FacingDirection::from_dx(direction) {
                            *facing = toward;
                        }
                        state.enter(ActorState::Walk);
                        anim.play(Clip::Walk);
                    }
                    AiDecision::Idle => {
                        state.enter(ActorState::Idle);
                        anim.play(Clip::Idle);
                    }
                }
            }
        }
    }
}
