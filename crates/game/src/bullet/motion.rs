use std::f32::consts::TAU;

use glam::Vec2;

use crate::net::ShotDirection;

pub const SPREAD_MIN_SHOTS: usize = 4;
pub const SPREAD_MAX_SHOTS: usize = 7;

/// Pattern-specific movement state of a live bullet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Linear,
    Spread {
        interval: f32,
        elapsed: f32,
    },
    /// Rigid rotation around `pivot`, radians per second, positive counter-clockwise.
    Fan {
        pivot: Vec2,
        angular_speed: f32,
    },
    /// Linear with a speed multiplier growing over the bullet's life.
    Ramp {
        rate: f32,
        max_scale: f32,
    },
}

impl Motion {
    pub fn spread(interval: f32) -> Self {
        Motion::Spread {
            interval,
            elapsed: 0.0,
        }
    }

    pub fn steers(&self) -> bool {
        !matches!(self, Motion::Fan { .. })
    }
}

/// Angle from `from` to `to` in radians, positive counter-clockwise.
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to))
}

/// Rotation sense of a fan bullet: an explicit shot direction wins,
/// otherwise the side of the screen center the bullet starts on.
pub fn fan_sense(position: Vec2, pivot: Vec2, center: Vec2, shot: ShotDirection) -> f32 {
    if let Some(sign) = shot.sign() {
        return sign;
    }
    local_fan_sense(position, pivot, center)
}

pub fn local_fan_sense(position: Vec2, pivot: Vec2, center: Vec2) -> f32 {
    let angle = signed_angle(
        (position - pivot).normalize_or_zero(),
        (center - pivot).normalize_or_zero(),
    );
    if angle < 0.0 { -1.0 } else { 1.0 }
}

/// Velocity that lands exactly on the rotated offset after `dt`.
pub fn fan_velocity(position: Vec2, pivot: Vec2, angular_speed: f32, dt: f32) -> Vec2 {
    if dt <= 0.0 {
        return Vec2::ZERO;
    }
    let offset = position - pivot;
    let target = pivot + Vec2::from_angle(angular_speed * dt).rotate(offset);
    (target - position) / dt
}

/// Child directions of a spread burst: evenly spaced, offset half a step
/// from the parent heading.
pub fn spread_directions(parent: Vec2, count: usize) -> Vec<Vec2> {
    let count = count.clamp(SPREAD_MIN_SHOTS, SPREAD_MAX_SHOTS);
    let parent = parent.normalize_or(Vec2::X);
    let step = TAU / count as f32;

    (0..count)
        .map(|i| Vec2::from_angle((i as f32 + 0.5) * step).rotate(parent))
        .collect()
}

/// Turns `current` towards `desired` by at most `max_angle` radians.
pub fn rotate_toward(current: Vec2, desired: Vec2, max_angle: f32) -> Vec2 {
    if desired.length_squared() <= f32::EPSILON {
        return current;
    }
    let angle = signed_angle(current, desired).clamp(-max_angle, max_angle);
    Vec2::from_angle(angle).rotate(current).normalize_or(current)
}
