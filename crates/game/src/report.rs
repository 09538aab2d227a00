use animation::FacingDirection;
use bevy_ecs::prelude::*;
use serde::Serialize;
use tracing::trace;
use utils::frame::FrameClock;

use crate::{
    character::{
        enemy::Enemy,
        health::Health,
        movement::Body,
        player::{block::Guard, mana::Mana, Player},
        status::ActorState,
        timers::{TimerKind, TimerSet},
    },
    loot::pickup::Economy,
    waves::{WavePhase, WaveState},
};

/// Snapshot of the player for HUDs and drivers, refreshed at the end of
/// every frame.
#[derive(Resource, Serialize, Debug, Clone, PartialEq, Default)]
pub struct PlayerReport {
    pub alive: bool,
    pub state: ActorState,
    pub x: f32,
    pub y: f32,
    pub on_ground: bool,
    pub facing: FacingDirection,
    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub mana_exhausted: bool,
    pub mana_draining: bool,
    pub mana_regening: bool,
    pub stunned: bool,
    pub block_raised: bool,
    pub block_cooldown: f32,
    pub coins: u32,
    /// Signed distance to the closest living enemy.
    pub nearest_enemy_dx: Option<f32>,
}

#[derive(Resource, Serialize, Debug, Clone, PartialEq, Default)]
pub struct WaveReport {
    pub wave: u32,
    pub phase: WavePhase,
    pub phase_time_left: f32,
    pub enemies_left: u32,
    pub live_enemies: u32,
}

type ReportedPlayer = (
    &'static ActorState,
    &'static Body,
    &'static FacingDirection,
    &'static Health,
    &'static Mana,
    &'static TimerSet,
    &'static Guard,
);

pub fn player_report_system(
    economy: Res<Economy>,
    mut report: ResMut<PlayerReport>,
    player_query: Query<ReportedPlayer, (With<Player>, Without<Enemy>)>,
    enemy_query: Query<(&ActorState, &Body), (With<Enemy>, Without<Player>)>,
) {
    let Ok((state, body, facing, health, mana, timers, guard)) = player_query.single() else {
        *report = PlayerReport {
            coins: economy.coins,
            ..Default::default()
        };
        return;
    };

    let nearest_enemy_dx = enemy_query
        .iter()
        .filter(|(s, _)| !s.is_dead())
        .map(|(_, b)| b.position.x - body.position.x)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()));

    *report = PlayerReport {
        alive: !state.is_dead(),
        state: *state,
        x: body.position.x,
        y: body.position.y,
        on_ground: body.on_ground,
        facing: *facing,
        health: health.current,
        max_health: health.max,
        mana: mana.current,
        max_mana: mana.max,
        mana_exhausted: mana.exhausted,
        mana_draining: mana.draining,
        mana_regening: mana.regening,
        stunned: timers.is_active(TimerKind::Stun),
        block_raised: guard.raised,
        block_cooldown: timers.remaining(TimerKind::BlockCooldown),
        coins: economy.coins,
        nearest_enemy_dx,
    };
}

pub fn wave_report_system(
    clock: Res<FrameClock>,
    wave_state: Res<WaveState>,
    mut report: ResMut<WaveReport>,
    enemy_query: Query<&ActorState, With<Enemy>>,
) {
    let live = enemy_query.iter().filter(|s| !s.is_dead()).count() as u32;
    let next = WaveReport {
        wave: wave_state.wave,
        phase: wave_state.phase,
        phase_time_left: wave_state.timer.max(0.0),
        enemies_left: wave_state.enemies_left(live),
        live_enemies: live,
    };
    if next.enemies_left != report.enemies_left {
        trace!(
            "sim{{f={} wave_report wave={} left={} live={}}}",
            clock.frame, next.wave, next.enemies_left, next.live_enemies
        );
    }
    *report = next;
}
