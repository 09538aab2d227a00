use animation::{AnimationState, FacingDirection};
use bevy_ecs::prelude::*;
use tracing::info;
use utils::net_id::{ActorId, ActorIdFactory};

use crate::{
    character::{
        health::Health, movement::Body, status::ActorState, timers::TimerSet, VisualHints,
    },
    collider::Collider,
    loot::LootGuard,
    weapons::melee::AttackState,
};

use super::{Enemy, EnemyConfig};

pub fn enemy_bundle(
    id: ActorId,
    name: &str,
    config: &EnemyConfig,
    x: f32,
    ground_y: f32,
) -> impl Bundle {
    let (half_width, half_height) = config.collider;
    (
        (
            id,
            Enemy::new(name, config.clone()),
            ActorState::Idle,
            Health::new(config.hp),
            TimerSet::default(),
            config.hit_reactions(),
        ),
        (
            Body::grounded_at(x, ground_y),
            FacingDirection::Left,
            AttackState::default(),
            AnimationState::default(),
            config.archetype.clip_set(),
            VisualHints::default(),
            Collider::new(half_width, half_height),
            LootGuard::default(),
        ),
    )
}

pub fn spawn_enemy(
    commands: &mut Commands,
    id_factory: &mut ActorIdFactory,
    name: &str,
    config: &EnemyConfig,
    x: f32,
    ground_y: f32,
) -> ActorId {
    let id = id_factory.next(name);

    commands.spawn(enemy_bundle(id.clone(), name, config, x, ground_y));

    info!("{} spawned as {:?} at x={:.1}", id, config.archetype, x);

    id
}
