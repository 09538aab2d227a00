use bevy_ecs::prelude::*;
use tracing::trace;
use utils::frame::FrameClock;

use crate::event::FrameEvents;

pub fn begin_frame_system(clock: Res<FrameClock>, mut events: ResMut<FrameEvents>) {
    events.begin_frame(clock.frame);
}

pub fn increase_frame_system(mut clock: ResMut<FrameClock>, events: Res<FrameEvents>) {
    if !events.is_empty() {
        trace!("sim{{f={} frame_end events={}}}", events.frame(), events.len());
    }
    clock.frame += 1;
}
