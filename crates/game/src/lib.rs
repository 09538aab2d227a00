pub mod character;
pub mod collider;
pub mod config;
pub mod core;
pub mod event;
pub mod frame;
pub mod loot;
pub mod report;
pub mod system_set;
pub mod waves;
pub mod weapons;
