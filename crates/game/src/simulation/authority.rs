use glam::Vec2;

use super::config::DispatchConfig;
use super::dispatch::Dispatcher;
use super::queue::SpawnQueue;
use crate::bullet::BulletEvent;
use crate::host::Viewport;
use crate::net::{DispatchStats, PatternKind, encode_level, encode_release};
use crate::pattern::{Difficulty, DifficultyConfig, PatternConfig, PatternContext, PatternScheduler};

/// The peer that decides what spawns: runs the generators, the difficulty
/// clock and the dispatch loop. Its own bullets live in a separate `Replica`.
pub struct SpawnAuthority {
    scheduler: PatternScheduler,
    queue: SpawnQueue,
    dispatcher: Dispatcher,
    difficulty: Difficulty,
}

impl SpawnAuthority {
    pub fn new(patterns: PatternConfig, dispatch: DispatchConfig, difficulty: DifficultyConfig) -> Self {
        Self::with_scheduler(PatternScheduler::new(patterns), dispatch, difficulty)
    }

    pub fn with_scheduler(
        scheduler: PatternScheduler,
        dispatch: DispatchConfig,
        difficulty: DifficultyConfig,
    ) -> Self {
        Self {
            scheduler,
            queue: SpawnQueue::new(),
            dispatcher: Dispatcher::new(dispatch),
            difficulty: Difficulty::new(difficulty),
        }
    }

    pub fn level(&self) -> f32 {
        self.difficulty.level()
    }

    pub fn scheduler(&self) -> &PatternScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PatternScheduler {
        &mut self.scheduler
    }

    pub fn queue(&self) -> &SpawnQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut SpawnQueue {
        &mut self.queue
    }

    pub fn stats(&self) -> &DispatchStats {
        self.dispatcher.stats()
    }

    pub fn start(&mut self, pattern: PatternKind) -> bool {
        self.scheduler.start(pattern)
    }

    pub fn stop(&mut self, pattern: PatternKind) {
        self.scheduler.stop(pattern);
    }

    /// One authoritative tick. `requests` are the events the authority's own
    /// replica produced this tick. Returns the packets to broadcast, in order.
    pub fn tick(
        &mut self,
        dt: f32,
        viewport: &dyn Viewport,
        target: Option<Vec2>,
        requests: &[BulletEvent],
    ) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();

        if let Some(level) = self.difficulty.advance(dt) {
            packets.push(encode_level(level));
            self.dispatcher.stats_mut().level_updates_sent += 1;
        }

        for request in requests {
            match *request {
                BulletEvent::SpreadShot { origin, direction } => {
                    self.scheduler.spread_burst(origin, direction, &mut self.queue);
                }
            }
        }

        let ctx = PatternContext {
            level: self.difficulty.level(),
            viewport,
            target,
        };
        self.scheduler.tick(dt, &ctx, &mut self.queue);

        packets.extend(self.dispatcher.update(dt, &mut self.queue));
        packets
    }

    /// Release message for a bullet a player consumed.
    pub fn release(&mut self, id: u16) -> Vec<u8> {
        self.dispatcher.stats_mut().releases_sent += 1;
        encode_release(id)
    }
}
