use barrage::{TargetProvider, Viewport};
use glam::Vec2;
use rand::Rng;

const ARRIVE_DISTANCE: f32 = 0.1;
/// Waypoints stay inside this viewport-space band.
const WANDER_MIN: f32 = 0.15;
const WANDER_MAX: f32 = 0.85;

/// Stand-in player that joins after a delay and drifts between random
/// waypoints on screen.
#[derive(Debug, Clone)]
pub struct WanderingTarget {
    join_delay: f32,
    speed: f32,
    position: Option<Vec2>,
    waypoint: Vec2,
}

impl WanderingTarget {
    pub fn new(join_delay: f32, speed: f32) -> Self {
        Self {
            join_delay: join_delay.max(0.0),
            speed,
            position: None,
            waypoint: Vec2::ZERO,
        }
    }

    /// Returns `true` on the tick the target joins.
    pub fn update<R: Rng>(&mut self, dt: f32, viewport: &dyn Viewport, rng: &mut R) -> bool {
        let Some(position) = self.position else {
            self.join_delay -= dt;
            if self.join_delay > 0.0 {
                return false;
            }
            self.position = Some(viewport.center());
            self.waypoint = pick_waypoint(viewport, rng);
            return true;
        };

        let to_waypoint = self.waypoint - position;
        let step = self.speed * dt;
        if to_waypoint.length() <= step.max(ARRIVE_DISTANCE) {
            self.position = Some(self.waypoint);
            self.waypoint = pick_waypoint(viewport, rng);
        } else {
            self.position = Some(position + to_waypoint.normalize_or_zero() * step);
        }
        false
    }
}

impl TargetProvider for WanderingTarget {
    fn current_target(&self) -> Option<Vec2> {
        self.position
    }
}

fn pick_waypoint<R: Rng>(viewport: &dyn Viewport, rng: &mut R) -> Vec2 {
    let point = Vec2::new(
        rng.random_range(WANDER_MIN..WANDER_MAX),
        rng.random_range(WANDER_MIN..WANDER_MAX),
    );
    viewport.viewport_to_world(point)
}
