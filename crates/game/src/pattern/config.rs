use serde::{Deserialize, Serialize};

use crate::bullet::SweepConfig;
use crate::net::PatternKind;

/// Spawn interval of one pattern: `max(base - (level + 1), min)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cadence {
    pub base: f32,
    pub min: f32,
}

impl Cadence {
    pub const fn new(base: f32, min: f32) -> Self {
        Self { base, min }
    }

    pub fn interval(&self, level: f32) -> f32 {
        (self.base - (level + 1.0)).max(self.min)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub normal: Cadence,
    pub spread: Cadence,
    pub fan: Cadence,
    pub winder: Cadence,
    pub cage: Cadence,

    /// Distance outside the screen diagonal where aimed bullets appear.
    pub spawn_margin: f32,
    pub exact_aim_chance: f64,
    pub aim_jitter_radius: f32,

    /// Sub-spawn interval written into spread records.
    pub spread_interval: f32,

    pub winder_min_ratio: f32,
    pub winder_max_ratio: f32,

    /// Extra lock time after a sweep run, covering dispatch delay.
    pub sweep_lock_slack: f32,
    pub sweep: SweepConfig,

    pub seed: Option<u64>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            normal: Cadence::new(2.5, 0.25),
            spread: Cadence::new(6.0, 1.5),
            fan: Cadence::new(5.0, 1.0),
            winder: Cadence::new(9.0, 4.0),
            cage: Cadence::new(10.0, 5.0),

            spawn_margin: 3.0,
            exact_aim_chance: 0.5,
            aim_jitter_radius: 5.0,

            spread_interval: 4.0,

            winder_min_ratio: 0.25,
            winder_max_ratio: 1.0,

            sweep_lock_slack: 0.5,
            sweep: SweepConfig::default(),

            seed: None,
        }
    }
}

impl PatternConfig {
    pub fn cadence(&self, pattern: PatternKind) -> Cadence {
        match pattern {
            PatternKind::Normal => self.normal,
            PatternKind::Spread => self.spread,
            PatternKind::Fan => self.fan,
            PatternKind::Winder => self.winder,
            PatternKind::Cage => self.cage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_shrinks_with_level_down_to_floor() {
        let cadence = Cadence::new(6.0, 1.5);
        assert_eq!(cadence.interval(1.0), 4.0);
        assert_eq!(cadence.interval(3.0), 2.0);
        assert_eq!(cadence.interval(5.0), 1.5);
    }
}
