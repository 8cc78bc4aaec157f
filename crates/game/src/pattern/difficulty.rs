use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: f32 = 1.0;
pub const MAX_LEVEL: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub start_level: f32,
    pub step: f32,
    pub step_seconds: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            start_level: MIN_LEVEL,
            step: 0.3,
            step_seconds: 30.0,
        }
    }
}

/// Play-time driven game level, clamped to `[1, 5]`.
#[derive(Debug, Clone)]
pub struct Difficulty {
    config: DifficultyConfig,
    level: f32,
    elapsed: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new(DifficultyConfig::default())
    }
}

impl Difficulty {
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            level: clamp_level(config.start_level),
            config,
            elapsed: 0.0,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Returns the new level when it changed.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += dt;
        let previous = self.level;

        while self.config.step_seconds > 0.0 && self.elapsed >= self.config.step_seconds {
            self.elapsed -= self.config.step_seconds;
            self.level = clamp_level(self.level + self.config.step);
        }

        if self.level != previous {
            log::info!("game level {previous:.1} -> {:.1}", self.level);
            Some(self.level)
        } else {
            None
        }
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }
}

pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        return MIN_LEVEL;
    }
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_every_thirty_seconds() {
        let mut difficulty = Difficulty::default();
        assert_eq!(difficulty.advance(29.0), None);
        assert_eq!(difficulty.level(), 1.0);

        let level = difficulty.advance(1.5).unwrap();
        assert!((level - 1.3).abs() < 1e-5);
    }

    #[test]
    fn saturates_at_max() {
        let mut difficulty = Difficulty::default();
        for _ in 0..100 {
            difficulty.advance(30.0);
        }
        assert_eq!(difficulty.level(), MAX_LEVEL);
        assert_eq!(difficulty.advance(30.0), None);
    }

    #[test]
    fn set_level_clamps() {
        let mut difficulty = Difficulty::default();
        difficulty.set_level(9.0);
        assert_eq!(difficulty.level(), 5.0);
        difficulty.set_level(f32::NAN);
        assert_eq!(difficulty.level(), 1.0);
    }
}
