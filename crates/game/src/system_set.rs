use bevy_ecs::prelude::SystemSet;

/// Simulation stages, chained in declaration order inside `Update`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SimSystemSet {
    Frame,
    Waves,
    Player,
    Spawning,
    Enemies,
    Projectiles,
    Collisions,
    Loot,
    Pickups,
    Cleanup,
    Animation,
    Report,
    FrameCounter,
}
