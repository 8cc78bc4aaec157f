use std::fmt::Debug;

use glam::Vec2;

/// The movable body behind a bullet. The core only ever writes a target
/// velocity (or a position when recycling); the host integrates.
pub trait KinematicActuator: Debug {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn set_position(&mut self, position: Vec2);

    /// Advance one step. Hosts with their own physics stepping may leave this empty.
    fn integrate(&mut self, dt: f32);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointBody {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl PointBody {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }
}

impl KinematicActuator for PointBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}
