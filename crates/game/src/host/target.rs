use glam::Vec2;

/// Source of the player the patterns aim at. `None` is a normal answer
/// (nobody has joined yet, or everyone is dead).
pub trait TargetProvider {
    fn current_target(&self) -> Option<Vec2>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedTarget(pub Option<Vec2>);

impl TargetProvider for FixedTarget {
    fn current_target(&self) -> Option<Vec2> {
        self.0
    }
}

impl<T: TargetProvider + ?Sized> TargetProvider for &T {
    fn current_target(&self) -> Option<Vec2> {
        (**self).current_target()
    }
}
