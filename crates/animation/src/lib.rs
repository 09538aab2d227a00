use std::collections::HashMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;
use utils::frame::FrameClock;

// CONFIG

/// Named animation clips an actor can request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "PascalCase")]
pub enum Clip {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Protect,
    Hurt,
    Jump,
    Dead,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ClipSpec {
    pub frames: u32,
    pub looping: bool,
}

impl ClipSpec {
    pub fn once(frames: u32) -> Self {
        Self {
            frames,
            looping: false,
        }
    }

    pub fn looped(frames: u32) -> Self {
        Self {
            frames,
            looping: true,
        }
    }
}

/// Frame counts and playback speed for every clip of one actor kind.
#[derive(Component, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClipSet {
    pub fps: f32,
    pub clips: HashMap<Clip, ClipSpec>,
}

impl ClipSet {
    pub fn new(fps: f32) -> Self {
        Self {
            fps,
            clips: HashMap::new(),
        }
    }

    pub fn with(mut self, clip: Clip, spec: ClipSpec) -> Self {
        self.clips.insert(clip, spec);
        self
    }

    /// Seconds a non-looping clip takes at playback rate 1.
    pub fn duration(&self, clip: Clip) -> Option<f32> {
        let spec = self.clips.get(&clip)?;
        if self.fps <= 0.0 {
            return Some(0.0);
        }
        Some(spec.frames as f32 / self.fps)
    }
}

// COMPONENT

#[derive(Component, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingDirection {
    Left,
    #[default]
    Right,
}

impl FacingDirection {
    /// Returns -1 for left, 1 for right
    pub fn to_int(&self) -> i32 {
        match self {
            FacingDirection::Left => -1,
            FacingDirection::Right => 1,
        }
    }

    pub fn sign(&self) -> f32 {
        self.to_int() as f32
    }

    /// Facing toward a horizontal offset; `None` when there is no horizontal motion.
    pub fn from_dx(dx: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(FacingDirection::Right)
        } else if dx < 0.0 {
            Some(FacingDirection::Left)
        } else {
            None
        }
    }

    pub fn should_flip_x(&self) -> bool {
        matches!(self, FacingDirection::Left)
    }
}

/// Currently playing clip with its headless playback clock.
#[derive(Component, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub clip: Clip,
    pub elapsed: f32,
    pub finished: bool,
    pub playback_rate: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            clip: Clip::Idle,
            elapsed: 0.0,
            finished: false,
            playback_rate: 1.0,
        }
    }
}

impl AnimationState {
    /// Request a clip. Asking for the clip already playing keeps its progress.
    pub fn play(&mut self, clip: Clip) {
        if self.clip != clip {
            self.restart(clip);
        }
    }

    pub fn restart(&mut self, clip: Clip) {
        self.clip = clip;
        self.elapsed = 0.0;
        self.finished = false;
    }

    /// `true` once the current non-looping clip reached its last frame.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance by `dt` seconds against the clip table.
    pub fn advance(&mut self, dt: f32, clips: &ClipSet) {
        let Some(spec) = clips.clips.get(&self.clip) else {
            // Nothing to play, treat as done so state machines never wait on it.
            self.finished = true;
            return;
        };

        self.elapsed += dt * self.playback_rate.max(0.0);

        if spec.looping || self.finished {
            return;
        }

        let duration = clips.duration(self.clip).unwrap_or(0.0);
        if self.elapsed >= duration {
            self.elapsed = duration;
            self.finished = true;
        }
    }

    /// Index of the frame being shown, for renderers.
    pub fn frame_index(&self, clips: &ClipSet) -> u32 {
        let Some(spec) = clips.clips.get(&self.clip) else {
            return 0;
        };
        if spec.frames == 0 {
            return 0;
        }
        let frame = (self.elapsed * clips.fps).floor() as u32;
        if spec.looping {
            frame % spec.frames
        } else {
            frame.min(spec.frames - 1)
        }
    }
}

// SYSTEM

pub fn advance_clips_system(
    clock: Res<FrameClock>,
    mut query: Query<(&mut AnimationState, &ClipSet)>,
) {
    for (mut state, clips) in query.iter_mut() {
        let was_finished = state.finished;
        state.advance(clock.delta, clips);
        if !was_finished && state.finished {
            trace!("anim{{f={} clip={:?} finished}}", clock.frame, state.clip);
        }
    }
}
