mod body;
mod target;
mod viewport;

pub use body::{KinematicActuator, PointBody};
pub use target::{FixedTarget, TargetProvider};
pub use viewport::{OrthoViewport, Viewport};
