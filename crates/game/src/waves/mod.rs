//! Encounter pacing.
//!
//! ```text
//! Break --break_time--> Fight (wave + 1) --fight_time--> Break --> ...
//! ```
//!
//! While a wave is running the scheduler rewrites the spawner's interval
//! bounds, live-enemy cap and archetype pool every tick, and enemies may only
//! spawn during `Fight` until the per-wave spawn limit is reached.

pub mod config;
pub mod state;
pub mod systems;

pub use config::{WaveTier, WavesConfig};
pub use state::{WavePhase, WaveState, WaveTransition};
