mod args;
mod autopilot;

use std::error::Error;

use args::Opt;
use autopilot::Autopilot;
use bevy_app::App;
use clap::Parser;
use game::{
    character::{health::DamageOutcome, player::input::PlayerIntents},
    config::GameConfig,
    core::{reset_world, CombatPlugin, RunInfo},
    event::{FrameEvents, GameEvent},
    report::{PlayerReport, WaveReport},
};
use serde::Serialize;
use tracing::info;
use utils::{frame::FrameClock, logs::setup_logging};

#[derive(Serialize, Debug, Default)]
struct RunSummary {
    run_id: String,
    seed: u64,
    frames: u32,
    seconds: f32,
    restarts: u32,
    spawned: u32,
    kills: u32,
    projectiles: u32,
    blocks: u32,
    coins: u32,
    wave: u32,
    player: PlayerReport,
    waves: WaveReport,
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::parse();

    let _logging_guard = setup_logging(opt.log_suffix.clone())?;

    let config = match &opt.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let mut app = App::new();
    app.add_plugins(CombatPlugin::new(config, opt.seed));

    let run = app.world().resource::<RunInfo>().clone();
    info!("arena {} run={} seed={} frames={}", run.version, run.run_id, run.seed, opt.frames);

    let mut pilot = Autopilot::default();
    let mut summary = RunSummary {
        run_id: run.run_id.clone(),
        seed: run.seed,
        ..Default::default()
    };

    for _ in 0..opt.frames {
        if !opt.idle {
            let intents = pilot.next(app.world().resource::<PlayerReport>());
            *app.world_mut().resource_mut::<PlayerIntents>() = intents;
        }

        app.update();
        summary.frames += 1;

        let mut player_died = false;
        let events = app.world().resource::<FrameEvents>();
        for event in events.iter() {
            match event {
                GameEvent::Spawned { .. } => summary.spawned += 1,
                GameEvent::ProjectileFired { .. } => summary.projectiles += 1,
                GameEvent::Died { id } if id.1 == "player" => player_died = true,
                GameEvent::Died { .. } => summary.kills += 1,
                _ => {}
            }
        }
        summary.blocks += events
            .combat()
            .filter(|c| c.outcome != DamageOutcome::Hit)
            .count() as u32;
        summary.wave = summary.wave.max(app.world().resource::<WaveReport>().wave);

        if player_died {
            if !opt.restart_on_death {
                info!("player died, stopping after {} frames", summary.frames);
                break;
            }
            summary.restarts += 1;
            reset_world(app.world_mut());
            pilot = Autopilot::default();
        }
    }

    summary.player = app.world().resource::<PlayerReport>().clone();
    summary.waves = app.world().resource::<WaveReport>().clone();
    summary.coins = summary.player.coins;
    summary.seconds = app.world().resource::<FrameClock>().elapsed();

    let pretty = ron::ser::to_string_pretty(&summary, ron::ser::PrettyConfig::default())?;
    println!("{pretty}");

    Ok(())
}
