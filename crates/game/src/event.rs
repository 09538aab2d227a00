use bevy_ecs::prelude::*;
use serde::Serialize;
use utils::net_id::ActorId;

use crate::{
    character::health::DamageOutcome, loot::pickup::PickupEffect, waves::state::WaveTransition,
};

/// One resolved damage application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatEvent {
    pub attacker: ActorId,
    pub defender: ActorId,
    pub amount: f32,
    pub outcome: DamageOutcome,
}

/// Everything the simulation reports to its collaborators during a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Combat(CombatEvent),
    Died {
        id: ActorId,
    },
    Spawned {
        id: ActorId,
        archetype: String,
        x: f32,
    },
    SpawnFailed {
        reason: String,
    },
    ProjectileFired {
        owner: ActorId,
        id: ActorId,
        x: f32,
        direction: i32,
    },
    LootDropped {
        from: ActorId,
        effect: PickupEffect,
    },
    Collected {
        id: ActorId,
        effect: PickupEffect,
    },
    WavePhaseChanged(WaveTransition),
}

/// Per-frame event list. Cleared in the first set of each frame, so readers
/// running after the simulation see exactly this frame's events.
#[derive(Resource, Debug, Default, Clone)]
pub struct FrameEvents {
    frame: u32,
    events: Vec<GameEvent>,
}

impl FrameEvents {
    pub fn begin_frame(&mut self, frame: u32) {
        self.frame = frame;
        self.events.clear();
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn combat(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Combat(c) => Some(c),
            _ => None,
        })
    }
}
