use animation::Clip;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::timers::{TimerKind, TimerSet};

/// Logical state tag of an actor, one per frame.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActorState {
    #[default]
    Idle,
    Walk,
    Run,
    Jump,
    Attack,
    Protect,
    Hurt,
    Stunned,
    Dead,
}

impl ActorState {
    /// Move to `next`. Returns `false` and leaves the state untouched when
    /// the actor is dead, since nothing leaves `Dead`.
    pub fn enter(&mut self, next: ActorState) -> bool {
        if *self == ActorState::Dead && next != ActorState::Dead {
            warn!("refused transition Dead -> {:?}", next);
            return false;
        }
        *self = next;
        true
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, ActorState::Dead)
    }

    /// Animation clip that represents this state.
    pub fn clip(&self) -> Clip {
        match self {
            ActorState::Idle => Clip::Idle,
            ActorState::Walk => Clip::Walk,
            ActorState::Run => Clip::Run,
            ActorState::Jump => Clip::Jump,
            ActorState::Attack => Clip::Attack,
            ActorState::Protect => Clip::Protect,
            ActorState::Hurt | ActorState::Stunned => Clip::Hurt,
            ActorState::Dead => Clip::Dead,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Enemy,
}

/// Winning status of the priority evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Dead,
    Stunned,
    Hurting,
    Attacking,
    Blocking,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInputs {
    pub role: Role,
    pub dead: bool,
    pub stunned: bool,
    pub hurting: bool,
    pub attacking: bool,
    pub block_held: bool,
    pub block_cooldown: bool,
}

impl StatusInputs {
    pub fn from_timers(
        role: Role,
        dead: bool,
        attacking: bool,
        block_held: bool,
        timers: &TimerSet,
    ) -> Self {
        Self {
            role,
            dead,
            stunned: timers.is_active(TimerKind::Stun),
            hurting: timers.is_active(TimerKind::Hurt),
            attacking,
            block_held,
            block_cooldown: timers.is_active(TimerKind::BlockCooldown),
        }
    }
}

/// Dead > Stunned > Hurting > Attacking > Blocking > Free, first match wins.
pub fn resolve_status(inputs: StatusInputs) -> Status {
    if inputs.dead {
        Status::Dead
    } else if inputs.stunned {
        Status::Stunned
    } else if inputs.hurting {
        Status::Hurting
    } else if inputs.attacking {
        Status::Attacking
    } else if inputs.role == Role::Player && inputs.block_held && !inputs.block_cooldown {
        Status::Blocking
    } else {
        Status::Free
    }
}
