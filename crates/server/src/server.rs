use std::collections::VecDeque;
use std::time::Instant;

use barrage::net::encode_level;
use barrage::{FixedTimestep, OrthoViewport, Replica, SpawnAuthority, TargetProvider};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ServerConfig;
use crate::events::{ServerEvent, StatsReport};
use crate::loopback::Loopback;
use crate::target::WanderingTarget;

/// Headless authority: runs the generators, broadcasts every packet to its
/// own replica and the loopback peers, and plays a simulated player.
pub struct SpawnServer {
    config: ServerConfig,
    timestep: FixedTimestep,
    viewport: OrthoViewport,
    authority: SpawnAuthority,
    host: Replica,
    loopback: Loopback,
    target: WanderingTarget,
    rng: StdRng,
    level: f32,
    since_stats: f32,
    last_frame: Instant,
    running: bool,
    pending_events: VecDeque<ServerEvent>,
}

impl SpawnServer {
    pub fn new(config: ServerConfig) -> Self {
        let rng = match config.pattern.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };

        let mut authority = SpawnAuthority::new(
            config.pattern.clone(),
            config.dispatch.clone(),
            config.difficulty.clone(),
        );
        for &pattern in &config.patterns {
            authority.start(pattern);
        }

        let peers = (0..config.replicas)
            .map(|_| Replica::new(config.replica.clone()))
            .collect();

        let mut pending_events = VecDeque::new();
        pending_events.push_back(ServerEvent::Started {
            replicas: config.replicas,
            tick_rate: config.tick_rate,
        });

        let mut server = Self {
            timestep: FixedTimestep::new(config.tick_rate),
            viewport: config.viewport,
            level: authority.level(),
            authority,
            host: Replica::new(config.replica.clone()),
            loopback: Loopback::new(peers, config.loss_percent),
            target: WanderingTarget::new(config.target.join_delay, config.target.speed),
            rng,
            since_stats: 0.0,
            last_frame: Instant::now(),
            running: true,
            pending_events,
            config,
        };

        // replicas start at level 1; bring them up to the configured start
        let level = encode_level(server.level);
        server.broadcast(&level);
        server
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.pending_events.drain(..)
    }

    /// Runs the ticks that are due since the last call.
    pub fn tick_once(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;

        let due = self.timestep.advance(delta.as_secs_f32());
        for _ in 0..due {
            if !self.running {
                break;
            }
            self.tick();
        }
    }

    /// One tick regardless of wall time.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        self.timestep.accumulate(self.timestep.dt());
        if self.timestep.consume_tick() {
            self.tick();
        }
    }

    pub fn finish(&mut self) {
        self.running = false;
        let report = self.report();
        self.pending_events.push_back(ServerEvent::Stats(report));
        self.pending_events.push_back(ServerEvent::Finished {
            ticks: self.timestep.ticks(),
            elapsed: self.timestep.elapsed(),
        });
    }

    fn tick(&mut self) {
        let dt = self.timestep.dt();

        if self.target.update(dt, &self.viewport, &mut self.rng) {
            self.pending_events.push_back(ServerEvent::TargetJoined);
        }
        let target = self.target.current_target();

        let requests = self.host.tick(dt, &self.viewport, target);
        self.loopback.tick(dt, &self.viewport, target);

        let packets = self.authority.tick(dt, &self.viewport, target, &requests);
        for packet in &packets {
            self.broadcast(packet);
        }

        if self.authority.level() != self.level {
            self.level = self.authority.level();
            self.pending_events
                .push_back(ServerEvent::LevelChanged { level: self.level });
        }

        self.resolve_hits();

        self.since_stats += dt;
        if self.since_stats >= self.config.stats_interval {
            self.since_stats = 0.0;
            let report = self.report();
            self.pending_events.push_back(ServerEvent::Stats(report));
        }

        if let Some(limit) = self.config.duration {
            if self.timestep.elapsed() >= f64::from(limit) {
                self.running = false;
            }
        }
    }

    fn broadcast(&mut self, packet: &[u8]) {
        if let Err(err) = self.host.receive(packet, &self.viewport) {
            self.pending_events.push_back(ServerEvent::PacketRejected {
                replica: 0,
                message: err.to_string(),
            });
        }

        for (index, err) in self.loopback.deliver(packet, &self.viewport, &mut self.rng) {
            self.pending_events.push_back(ServerEvent::PacketRejected {
                replica: index + 1,
                message: err.to_string(),
            });
        }
    }

    /// Addressable bullets touching the player may land; each hit releases
    /// the bullet on every peer.
    fn resolve_hits(&mut self) {
        let Some(target) = self.target.current_target() else {
            return;
        };

        let radius = self.config.target.hit_radius;
        let touching: Vec<u16> = self
            .host
            .bullets()
            .filter(|b| b.id() != 0 && b.is_launched())
            .filter(|b| b.position().distance(target) <= radius)
            .map(|b| b.id())
            .collect();

        let chance = self.config.target.hit_chance.clamp(0.0, 1.0);
        for id in touching {
            if !self.rng.random_bool(chance) {
                continue;
            }
            let release = self.authority.release(id);
            self.broadcast(&release);
            self.pending_events.push_back(ServerEvent::PlayerHit { id });
        }
    }

    fn report(&self) -> StatsReport {
        StatsReport {
            elapsed: self.timestep.elapsed(),
            level: self.authority.level(),
            queued: self.authority.queue().len(),
            dispatch: self.authority.stats().clone(),
            host: self.host.stats().clone(),
            host_active: self.host.active_count(),
            sweep_runs: self.host.sweep_runs().len(),
            replica_active: self
                .loopback
                .peers()
                .iter()
                .map(Replica::active_count)
                .collect(),
            packets_lost: self.loopback.lost(),
        }
    }
}
