mod config;
mod entity;
mod motion;
mod sweep;

pub use config::BulletConfig;
pub use entity::{Bullet, BulletContext, BulletEvent, BulletState, ReleaseReason};
pub use motion::{
    Motion, SPREAD_MAX_SHOTS, SPREAD_MIN_SHOTS, fan_sense, fan_velocity, local_fan_sense,
    rotate_toward, signed_angle, spread_directions,
};
pub use sweep::{
    CornerMask, SHOT_PER_CORNER, SweepConfig, SweepKind, SweepPhase, SweepPlan, SweepRun,
    SweepShot, sweep_senses,
};
