mod config;
mod difficulty;
mod generators;
mod ids;
mod scheduler;

pub use config::{Cadence, PatternConfig};
pub use difficulty::{Difficulty, DifficultyConfig, MAX_LEVEL, MIN_LEVEL, clamp_level};
pub use generators::{aim, fan_shots, pick_corners, spawn_point, sweep_order};
pub use ids::BulletIdAllocator;
pub use scheduler::{PatternContext, PatternScheduler, TaskState, Yield};
