use glam::Vec2;

use super::config::BulletConfig;
use super::motion::{Motion, fan_velocity, rotate_toward};
use crate::host::{KinematicActuator, PointBody, Viewport};
use crate::net::PatternKind;
use crate::pool::Poolable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletState {
    Spawned,
    Launched,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    LeftScreen,
    Expired,
}

/// Side effects a bullet asks its owner to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletEvent {
    SpreadShot { origin: Vec2, direction: Vec2 },
}

pub struct BulletContext<'a> {
    pub dt: f32,
    pub viewport: &'a dyn Viewport,
    pub target: Option<Vec2>,
}

#[derive(Debug)]
pub struct Bullet {
    id: u16,
    pattern: Option<PatternKind>,
    state: BulletState,
    direction: Vec2,
    speed: f32,
    speed_scale: f32,
    life_timer: f32,
    lifespan: f32,
    margin: f32,
    was_on_screen: bool,
    homing_turn_rate: Option<f32>,
    motion: Motion,
    body: Box<dyn KinematicActuator>,
}

impl Bullet {
    pub fn new(config: &BulletConfig, body: Box<dyn KinematicActuator>) -> Self {
        Self {
            id: 0,
            pattern: None,
            state: BulletState::Released,
            direction: Vec2::ZERO,
            speed: config.speed,
            speed_scale: 1.0,
            life_timer: 0.0,
            lifespan: config.lifespan,
            margin: config.viewport_margin,
            was_on_screen: false,
            homing_turn_rate: None,
            motion: Motion::Linear,
            body,
        }
    }

    pub fn with_point_body(config: &BulletConfig) -> Self {
        Self::new(config, Box::new(PointBody::default()))
    }

    /// Network id, 0 for bullets nobody else can address.
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id;
    }

    pub fn pattern(&self) -> Option<PatternKind> {
        self.pattern
    }

    pub fn state(&self) -> BulletState {
        self.state
    }

    pub fn is_launched(&self) -> bool {
        self.state == BulletState::Launched
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed_scale(&self) -> f32 {
        self.speed_scale
    }

    pub fn life_timer(&self) -> f32 {
        self.life_timer
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity()
    }

    pub fn set_pattern(&mut self, pattern: PatternKind, direction: Vec2, motion: Motion, speed_scale: f32) {
        self.pattern = Some(pattern);
        self.direction = direction.normalize_or_zero();
        self.motion = motion;
        self.speed_scale = speed_scale;
    }

    /// Enables steering towards the target, `turn_rate` in radians per second.
    pub fn set_homing(&mut self, turn_rate: Option<f32>) {
        self.homing_turn_rate = turn_rate;
    }

    pub fn tick(&mut self, ctx: &BulletContext<'_>, events: &mut Vec<BulletEvent>) -> Option<ReleaseReason> {
        if self.state == BulletState::Released {
            return None;
        }

        let dt = ctx.dt;
        let position = self.body.position();

        if let (Some(turn_rate), Some(target)) = (self.homing_turn_rate, ctx.target) {
            if self.motion.steers() {
                self.direction = rotate_toward(self.direction, target - position, turn_rate * dt);
            }
        }

        let base_velocity = self.direction * self.speed * self.speed_scale;
        let velocity = match &mut self.motion {
            Motion::Linear => base_velocity,
            Motion::Spread { interval, elapsed } => {
                if self.state == BulletState::Launched {
                    *elapsed += dt;
                    if *elapsed >= *interval {
                        *elapsed = 0.0;
                        events.push(BulletEvent::SpreadShot {
                            origin: position,
                            direction: self.direction,
                        });
                    }
                }
                base_velocity
            }
            Motion::Fan {
                pivot,
                angular_speed,
            } => fan_velocity(position, *pivot, *angular_speed, dt),
            Motion::Ramp { rate, max_scale } => {
                base_velocity * (1.0 + *rate * self.life_timer).min(*max_scale)
            }
        };

        self.body.set_velocity(velocity);
        self.body.integrate(dt);

        if let Some(reason) = self.check_boundary(ctx.viewport) {
            self.state = BulletState::Released;
            return Some(reason);
        }

        self.life_timer += dt;
        if self.life_timer >= self.lifespan {
            self.state = BulletState::Released;
            return Some(ReleaseReason::Expired);
        }
        None
    }

    fn check_boundary(&mut self, viewport: &dyn Viewport) -> Option<ReleaseReason> {
        let vp = viewport.world_to_viewport(self.body.position());
        let (lo, hi) = (-self.margin, 1.0 + self.margin);
        let on_screen = vp.z > 0.0 && (lo..=hi).contains(&vp.x) && (lo..=hi).contains(&vp.y);

        if !self.was_on_screen && on_screen {
            self.was_on_screen = true;
            self.state = BulletState::Launched;
        } else if self.was_on_screen && !on_screen {
            return Some(ReleaseReason::LeftScreen);
        }
        None
    }
}

impl Poolable for Bullet {
    fn on_acquire(&mut self, position: Vec2, _rotation: f32) {
        self.id = 0;
        self.pattern = None;
        self.state = BulletState::Spawned;
        self.direction = Vec2::ZERO;
        self.speed_scale = 1.0;
        self.life_timer = 0.0;
        self.was_on_screen = false;
        self.homing_turn_rate = None;
        self.motion = Motion::Linear;
        self.body.set_position(position);
        self.body.set_velocity(Vec2::ZERO);
    }

    fn on_release(&mut self) {
        self.state = BulletState::Released;
        self.body.set_velocity(Vec2::ZERO);
    }
}
