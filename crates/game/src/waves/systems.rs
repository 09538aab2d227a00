use bevy_ecs::prelude::*;
use tracing::{info, span, Level};
use utils::frame::FrameClock;

use crate::{
    character::enemy::spawning::Spawner,
    event::{FrameEvents, GameEvent},
};

use super::state::WaveState;

pub fn wave_update_system(
    clock: Res<FrameClock>,
    mut wave_state: ResMut<WaveState>,
    mut spawner: ResMut<Spawner>,
    mut events: ResMut<FrameEvents>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "wave_update");
    let _enter = system_span.enter();

    let Some(transition) = wave_state.update(clock.delta, &mut spawner) else {
        return;
    };

    info!(
        "sim{{f={} wave_update phase={:?}->{:?} wave={} spawn_limit={} max_enemies={} interval=[{:.2},{:.2}]}}",
        clock.frame,
        transition.from,
        transition.to,
        transition.wave,
        wave_state.spawn_limit,
        spawner.max_enemies,
        spawner.interval_min,
        spawner.interval_max,
    );

    events.push(GameEvent::WavePhaseChanged(transition));
}
