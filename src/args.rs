use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Run the arena simulation headless for a fixed number of frames")]
pub struct Opt {
    /// Frames to simulate at 60 fps.
    #[arg(short, long, default_value_t = 3600)]
    pub frames: u32,
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,
    /// RON file with tuning overrides. Built-in defaults when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Suffix of the log file under `logs/`.
    #[arg(long)]
    pub log_suffix: Option<String>,
    /// Leave the player standing still instead of driving it.
    #[arg(long)]
    pub idle: bool,
    /// Reset the world when the player dies instead of stopping.
    #[arg(long)]
    pub restart_on_death: bool,
}
