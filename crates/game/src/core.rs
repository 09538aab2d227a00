use animation::advance_clips_system;
use bevy_app::{App, Plugin, Startup, Update};
use bevy_ecs::prelude::*;
use tracing::{debug, info};
use utils::{
    cid::run_correlation_id,
    frame::FrameClock,
    net_id::{ActorId, ActorIdFactory},
    rng::SimRng,
};

use crate::{
    character::{
        enemy::{
            ai::enemy_update_system,
            spawning::{enemy_spawning_system, Spawner},
            Enemy,
        },
        movement::WorldBounds,
        player::{input::PlayerIntents, player_bundle, player_update_system},
        update_visual_hints_system,
    },
    config::GameConfig,
    event::FrameEvents,
    frame::{begin_frame_system, increase_frame_system},
    loot::{
        loot_drop_system,
        pickup::{pickup_update_system, Economy, Pickup},
    },
    report::{player_report_system, wave_report_system, PlayerReport, WaveReport},
    system_set::SimSystemSet,
    waves::{systems::wave_update_system, WaveState},
    weapons::projectile::{projectile_collision_system, projectile_movement_system, Projectile},
};

// Identity of one simulation run, attached to the summary and log lines
#[derive(Debug, Clone, Resource)]
pub struct RunInfo {
    pub version: String,
    pub seed: u64,
    pub run_id: String,
}

impl RunInfo {
    pub fn new(seed: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").into(),
            seed,
            run_id: run_correlation_id(seed),
        }
    }
}

// Combat and encounter plugin.
// Inserts every simulation resource, chains the system sets inside `Update`
// and resets the world once at startup. One `app.update()` is one frame.
#[derive(Debug, Clone, Default)]
pub struct CombatPlugin {
    pub config: GameConfig,
    pub seed: u64,
}

impl CombatPlugin {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self { config, seed }
    }
}

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        let mut rng = SimRng::from_seed(self.seed);
        let spawner = Spawner::new(self.config.spawner.clone(), &mut rng);

        app.insert_resource(self.config.clone())
            .insert_resource(WorldBounds::from(&self.config.world))
            .insert_resource(WaveState::new(self.config.waves.clone()))
            .insert_resource(spawner)
            .insert_resource(rng)
            .insert_resource(RunInfo::new(self.seed));

        app.init_resource::<FrameClock>()
            .init_resource::<ActorIdFactory>()
            .init_resource::<FrameEvents>()
            .init_resource::<PlayerIntents>()
            .init_resource::<Economy>()
            .init_resource::<PlayerReport>()
            .init_resource::<WaveReport>();

        app.configure_sets(
            Update,
            (
                SimSystemSet::Frame,
                SimSystemSet::Waves,
                SimSystemSet::Player,
                SimSystemSet::Spawning,
                SimSystemSet::Enemies,
                SimSystemSet::Projectiles,
                SimSystemSet::Collisions,
                SimSystemSet::Loot,
                SimSystemSet::Pickups,
                SimSystemSet::Cleanup,
                SimSystemSet::Animation,
                SimSystemSet::Report,
                SimSystemSet::FrameCounter,
            )
                .chain(),
        );

        app.add_systems(Startup, reset_world);

        app.add_systems(Update, begin_frame_system.in_set(SimSystemSet::Frame));
        app.add_systems(Update, wave_update_system.in_set(SimSystemSet::Waves));
        app.add_systems(Update, player_update_system.in_set(SimSystemSet::Player));
        app.add_systems(Update, enemy_spawning_system.in_set(SimSystemSet::Spawning));
        app.add_systems(Update, enemy_update_system.in_set(SimSystemSet::Enemies));
        app.add_systems(Update, projectile_movement_system.in_set(SimSystemSet::Projectiles));
        app.add_systems(Update, projectile_collision_system.in_set(SimSystemSet::Collisions));
        app.add_systems(Update, loot_drop_system.in_set(SimSystemSet::Loot));
        app.add_systems(Update, pickup_update_system.in_set(SimSystemSet::Pickups));
        app.add_systems(Update, cleanup_system.in_set(SimSystemSet::Cleanup));
        app.add_systems(
            Update,
            (advance_clips_system, update_visual_hints_system)
                .chain()
                .in_set(SimSystemSet::Animation),
        );
        app.add_systems(
            Update,
            (player_report_system, wave_report_system).in_set(SimSystemSet::Report),
        );
        app.add_systems(Update, increase_frame_system.in_set(SimSystemSet::FrameCounter));
    }
}

/// Despawn every actor and rebuild the starting state: fresh ids, empty
/// purse, wave 0 break, spawner back to its configured parameters and a new
/// player at the start position. The rng stream and frame clock keep going.
pub fn reset_world(world: &mut World) {
    let actors: Vec<Entity> = world
        .query_filtered::<Entity, With<ActorId>>()
        .iter(world)
        .collect();
    let despawned = actors.len();
    for entity in actors {
        world.despawn(entity);
    }

    world.resource_mut::<ActorIdFactory>().reset();
    world.resource_mut::<FrameEvents>().clear();
    *world.resource_mut::<Economy>() = Economy::default();
    *world.resource_mut::<PlayerIntents>() = PlayerIntents::default();
    *world.resource_mut::<PlayerReport>() = PlayerReport::default();
    *world.resource_mut::<WaveReport>() = WaveReport::default();
    world.resource_mut::<WaveState>().start();
    world.resource_scope(|world, mut rng: Mut<SimRng>| {
        world.resource_mut::<Spawner>().reset(&mut rng);
    });

    let player_config = world.resource::<GameConfig>().player.clone();
    let ground_y = world.resource::<WorldBounds>().ground_y;
    let id = world.resource_mut::<ActorIdFactory>().next("player");
    world.spawn(player_bundle(id.clone(), &player_config, ground_y));

    let frame = world.resource::<FrameClock>().frame;
    info!(
        "sim{{f={} reset_world despawned={} player={} x={:.1}}}",
        frame, despawned, id, player_config.start_x
    );
}

type Disposable = (
    Entity,
    &'static ActorId,
    Option<&'static Enemy>,
    Option<&'static Projectile>,
    Option<&'static Pickup>,
);

/// Despawns faded corpses, spent projectiles and collected or expired
/// pickups. Nothing else removes entities during a frame.
pub fn cleanup_system(mut commands: Commands, clock: Res<FrameClock>, query: Query<Disposable>) {
    for (entity, id, enemy, projectile, pickup) in query.iter() {
        let done = enemy.is_some_and(|e| e.remove)
            || projectile.is_some_and(|p| p.is_expired())
            || pickup.is_some_and(|p| p.is_expired());
        if done {
            debug!("sim{{f={} cleanup despawn {}}}", clock.frame, id);
            commands.entity(entity).despawn();
        }
    }
}
