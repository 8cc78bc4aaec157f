use std::collections::VecDeque;

use crate::net::{CodecError, SpawnOrder, SpawnRecord};

/// Outgoing spawn requests. Generators push, the dispatcher drains.
#[derive(Debug, Default)]
pub struct SpawnQueue {
    records: VecDeque<SpawnRecord>,
    enqueued: u64,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SpawnRecord) {
        self.records.push_back(record);
        self.enqueued += 1;
    }

    /// Encodes the order first, so a rejected order never leaves a partial record.
    pub fn push_order(&mut self, order: &SpawnOrder) -> Result<(), CodecError> {
        let record = order.to_record()?;
        self.push(record);
        Ok(())
    }

    pub fn drain_up_to(&mut self, max: usize) -> Vec<SpawnRecord> {
        let count = max.min(self.records.len());
        self.records.drain(..count).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_enqueued(&self) -> u64 {
        self.enqueued
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::bullet::SweepKind;
    use crate::net::Corner;

    fn normal(id: u16) -> SpawnOrder {
        SpawnOrder::Normal {
            id,
            position: Vec2::ZERO,
            direction: Vec2::X,
        }
    }

    #[test]
    fn drains_in_fifo_order() {
        let mut queue = SpawnQueue::new();
        for id in 1..=5 {
            queue.push_order(&normal(id)).unwrap();
        }

        let first: Vec<_> = queue.drain_up_to(3).iter().map(|r| r.id).collect();
        assert_eq!(first, vec![1, 2, 3]);
        let rest: Vec<_> = queue.drain_up_to(30).iter().map(|r| r.id).collect();
        assert_eq!(rest, vec![4, 5]);
        assert!(queue.is_empty());
        assert_eq!(queue.total_enqueued(), 5);
    }

    #[test]
    fn rejected_order_is_not_enqueued() {
        let mut queue = SpawnQueue::new();
        let bad = SpawnOrder::Sweep {
            id: 1,
            kind: SweepKind::Winder,
            corners: [Corner::LeftUpper, Corner::LeftLower],
            branches: 2,
            ratio: 0.5,
        };
        assert!(queue.push_order(&bad).is_err());
        assert!(queue.is_empty());
    }
}
