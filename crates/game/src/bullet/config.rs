use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletConfig {
    pub speed: f32,
    pub lifespan: f32,

    /// Slack around the normalized viewport, on every side.
    pub viewport_margin: f32,

    pub spread_interval: f32,

    pub fan_angular_speed_deg: f32,

    /// Speed multiplier gained per second of flight by winder bullets.
    pub winder_ramp: f32,
    pub winder_max_scale: f32,

    pub homing: bool,
    pub homing_turn_base_deg: f32,
    pub homing_turn_per_level_deg: f32,
    pub homing_turn_min_deg: f32,
    pub homing_turn_max_deg: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            lifespan: 15.0,

            viewport_margin: 0.08,

            spread_interval: 4.0,

            fan_angular_speed_deg: 45.0,

            winder_ramp: 0.5,
            winder_max_scale: 2.0,

            homing: false,
            homing_turn_base_deg: 28.0,
            homing_turn_per_level_deg: 2.0,
            homing_turn_min_deg: 30.0,
            homing_turn_max_deg: 60.0,
        }
    }
}

impl BulletConfig {
    /// Signed fan angular speed in radians per second.
    pub fn fan_angular_speed(&self, level: f32, sense: f32) -> f32 {
        (self.fan_angular_speed_deg + level).to_radians() * sense
    }

    /// Homing turn limit in radians per second.
    pub fn homing_turn_rate(&self, level: f32) -> f32 {
        (self.homing_turn_base_deg + self.homing_turn_per_level_deg * level)
            .clamp(self.homing_turn_min_deg, self.homing_turn_max_deg)
            .to_radians()
    }
}
