/// Hands out network bullet ids. Wraps around and never returns 0.
#[derive(Debug, Clone, Default)]
pub struct BulletIdAllocator {
    last: u16,
}

impl BulletIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u16 {
        self.last = self.last.wrapping_add(1);
        if self.last == 0 {
            self.last = 1;
        }
        self.last
    }

    pub fn last(&self) -> u16 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_zero_on_wrap() {
        let mut ids = BulletIdAllocator { last: u16::MAX - 1 };
        assert_eq!(ids.next_id(), u16::MAX);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }
}
