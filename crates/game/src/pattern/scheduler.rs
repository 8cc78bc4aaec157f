use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::PatternConfig;
use super::generators::{aim, fan_shots, spawn_point, sweep_order};
use super::ids::BulletIdAllocator;
use crate::bullet::{SPREAD_MAX_SHOTS, SPREAD_MIN_SHOTS, SweepKind, SweepPlan, spread_directions};
use crate::host::Viewport;
use crate::net::{PatternKind, SpawnOrder};
use crate::simulation::SpawnQueue;

/// Where a generator suspends until its next resume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    Seconds(f32),
    UntilTarget,
    NextTick,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskState {
    Idle,
    Running { wait: Yield },
}

pub struct PatternContext<'a> {
    pub level: f32,
    pub viewport: &'a dyn Viewport,
    pub target: Option<Vec2>,
}

/// Runs one cooperative generator per pattern, all resumed from the same tick.
pub struct PatternScheduler {
    config: PatternConfig,
    tasks: [TaskState; 5],
    ids: BulletIdAllocator,
    rng: StdRng,
    clock: f32,
    sweep_locked_until: [f32; 2],
}

impl PatternScheduler {
    pub fn new(config: PatternConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: PatternConfig, rng: StdRng) -> Self {
        Self {
            config,
            tasks: [TaskState::Idle; 5],
            ids: BulletIdAllocator::new(),
            rng,
            clock: 0.0,
            sweep_locked_until: [0.0; 2],
        }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Starts a generator. Returns `false` if it was already running.
    pub fn start(&mut self, pattern: PatternKind) -> bool {
        let task = &mut self.tasks[pattern.index()];
        if *task != TaskState::Idle {
            return false;
        }
        *task = TaskState::Running {
            wait: Yield::UntilTarget,
        };
        log::debug!("pattern {} started", pattern.name());
        true
    }

    pub fn start_all(&mut self) {
        for pattern in PatternKind::ALL {
            self.start(pattern);
        }
    }

    /// Safe at any suspension point; records are only ever produced whole.
    pub fn stop(&mut self, pattern: PatternKind) {
        if self.tasks[pattern.index()] != TaskState::Idle {
            log::debug!("pattern {} stopped", pattern.name());
        }
        self.tasks[pattern.index()] = TaskState::Idle;
    }

    pub fn stop_all(&mut self) {
        for pattern in PatternKind::ALL {
            self.stop(pattern);
        }
    }

    pub fn is_running(&self, pattern: PatternKind) -> bool {
        self.tasks[pattern.index()] != TaskState::Idle
    }

    pub fn state(&self, pattern: PatternKind) -> TaskState {
        self.tasks[pattern.index()]
    }

    pub fn sweep_locked(&self, kind: SweepKind) -> bool {
        self.clock < self.sweep_locked_until[sweep_slot(kind)]
    }

    pub fn tick(&mut self, dt: f32, ctx: &PatternContext<'_>, queue: &mut SpawnQueue) {
        self.clock += dt;

        for pattern in PatternKind::ALL {
            let TaskState::Running { wait } = self.tasks[pattern.index()] else {
                continue;
            };

            let ready = match wait {
                Yield::Seconds(remaining) => {
                    let remaining = remaining - dt;
                    if remaining > 0.0 {
                        self.tasks[pattern.index()] = TaskState::Running {
                            wait: Yield::Seconds(remaining),
                        };
                        false
                    } else {
                        true
                    }
                }
                Yield::UntilTarget => ctx.target.is_some(),
                Yield::NextTick => true,
            };

            if ready {
                let wait = self.resume(pattern, ctx, queue);
                self.tasks[pattern.index()] = TaskState::Running { wait };
            }
        }
    }

    /// Enqueues the radial children of a spread bullet. Returns how many.
    pub fn spread_burst(&mut self, origin: Vec2, direction: Vec2, queue: &mut SpawnQueue) -> usize {
        let count = self.rng.random_range(SPREAD_MIN_SHOTS..=SPREAD_MAX_SHOTS);
        for child in spread_directions(direction, count) {
            let order = SpawnOrder::Normal {
                id: self.ids.next_id(),
                position: origin,
                direction: child,
            };
            self.enqueue(&order, queue);
        }
        count
    }

    fn resume(&mut self, pattern: PatternKind, ctx: &PatternContext<'_>, queue: &mut SpawnQueue) -> Yield {
        let interval = self.config.cadence(pattern).interval(ctx.level);
        let Some(target) = ctx.target else {
            return Yield::Seconds(interval);
        };

        match pattern {
            PatternKind::Normal | PatternKind::Spread => {
                let position = spawn_point(&mut self.rng, ctx.viewport, self.config.spawn_margin);
                let direction = aim(&mut self.rng, position, target, &self.config);
                let id = self.ids.next_id();
                let order = if pattern == PatternKind::Normal {
                    SpawnOrder::Normal {
                        id,
                        position,
                        direction,
                    }
                } else {
                    SpawnOrder::Spread {
                        id,
                        position,
                        direction,
                        interval: Some(self.config.spread_interval),
                    }
                };
                self.enqueue(&order, queue);
                Yield::Seconds(interval)
            }
            PatternKind::Fan => {
                let position = spawn_point(&mut self.rng, ctx.viewport, self.config.spawn_margin);
                let (shots, pivot) = fan_shots(&mut self.rng, position, ctx.viewport);
                let order = SpawnOrder::Fan {
                    id: self.ids.next_id(),
                    position,
                    pivot,
                    shots,
                };
                self.enqueue(&order, queue);
                Yield::Seconds(interval)
            }
            PatternKind::Winder | PatternKind::Cage => {
                let Some(kind) = SweepKind::from_pattern(pattern) else {
                    return Yield::Seconds(interval);
                };
                let slot = sweep_slot(kind);
                if self.clock < self.sweep_locked_until[slot] {
                    return Yield::Seconds(self.sweep_locked_until[slot] - self.clock);
                }

                let order = sweep_order(&mut self.rng, self.ids.next_id(), kind, &self.config);
                let SpawnOrder::Sweep {
                    corners,
                    branches,
                    ratio,
                    ..
                } = order
                else {
                    return Yield::Seconds(interval);
                };

                if self.enqueue(&order, queue) {
                    let plan = SweepPlan::new(kind, corners, branches, ratio, &self.config.sweep);
                    let lock = plan.duration() + self.config.sweep_lock_slack;
                    self.sweep_locked_until[slot] = self.clock + lock;
                    Yield::Seconds(interval.max(lock))
                } else {
                    Yield::Seconds(interval)
                }
            }
        }
    }

    fn enqueue(&mut self, order: &SpawnOrder, queue: &mut SpawnQueue) -> bool {
        match queue.push_order(order) {
            Ok(()) => {
                log::trace!("queued {} bullet {}", order.pattern().name(), order.id());
                true
            }
            Err(err) => {
                log::error!("dropping {} bullet {}: {err}", order.pattern().name(), order.id());
                false
            }
        }
    }
}

fn sweep_slot(kind: SweepKind) -> usize {
    match kind {
        SweepKind::Winder => 0,
        SweepKind::Cage => 1,
    }
}
