use bevy_ecs::prelude::*;

/// Nominal simulation rate used when no explicit delta is configured.
pub const DEFAULT_TICK_RATE: f32 = 60.0;

/// Fixed-step clock shared by every simulation system.
///
/// `frame` is bumped once at the very end of a frame, so all systems of one
/// frame observe the same value. `delta` is the elapsed time in seconds that
/// every timer and integrator consumes this frame.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    pub frame: u32,
    pub delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            frame: 0,
            delta: 1.0 / DEFAULT_TICK_RATE,
        }
    }
}

impl FrameClock {
    /// Seconds of simulated time since frame zero.
    pub fn elapsed(&self) -> f32 {
        self.frame as f32 * self.delta
    }
}
