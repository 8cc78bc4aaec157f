use glam::Vec2;

use super::config::ReplicaConfig;
use crate::bullet::{
    Bullet, BulletContext, BulletEvent, Motion, SweepKind, SweepPlan, SweepRun, SweepShot,
    fan_sense,
};
use crate::host::Viewport;
use crate::net::{Corner, MalformedPacket, Packet, PatternKind, ReplicaStats, SpawnOrder, SpawnRecord};
use crate::pattern::{MIN_LEVEL, clamp_level};
use crate::pool::{Handle, ObjectPool, PoolError};

pub const BULLET_KIND: &str = "bullet";

/// One peer's view of the bullet field: decodes spawn traffic, owns the
/// pool and steps every live bullet.
pub struct Replica {
    config: ReplicaConfig,
    pool: ObjectPool<Bullet>,
    runs: Vec<SweepRun>,
    level: f32,
    stats: ReplicaStats,
    shots: Vec<SweepShot>,
    released: Vec<Handle>,
}

impl Replica {
    pub fn new(config: ReplicaConfig) -> Self {
        let mut pool = ObjectPool::new();
        let bullet_config = config.bullet.clone();
        pool.register(
            BULLET_KIND,
            move || Bullet::with_point_body(&bullet_config),
            config.prewarm,
        );

        Self {
            config,
            pool,
            runs: Vec::new(),
            level: MIN_LEVEL,
            stats: ReplicaStats::default(),
            shots: Vec::new(),
            released: Vec::new(),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }

    pub fn stats(&self) -> &ReplicaStats {
        &self.stats
    }

    pub fn pool(&self) -> &ObjectPool<Bullet> {
        &self.pool
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.pool.iter_active().map(|(_, bullet)| bullet)
    }

    pub fn bullet_by_id(&self, id: u16) -> Option<&Bullet> {
        self.pool.handle_by_id(id).and_then(|handle| self.pool.get(handle))
    }

    pub fn sweep_runs(&self) -> &[SweepRun] {
        &self.runs
    }

    /// Applies one message from the spawn channel. A malformed packet is
    /// dropped whole.
    pub fn receive(&mut self, data: &[u8], viewport: &dyn Viewport) -> Result<(), MalformedPacket> {
        self.stats.packets_received += 1;
        self.stats.bytes_received += data.len() as u64;

        let packet = Packet::decode(data).map_err(|err| self.drop_packet(err))?;
        match packet {
            Packet::Spawn(records) => self.apply_spawn(&records, viewport)?,
            Packet::Release(id) => {
                // unknown ids are logged by the pool
                let _ = self.release(id);
            }
            Packet::Level(level) => self.set_level(level),
        }
        Ok(())
    }

    pub fn apply_spawn(&mut self, records: &[SpawnRecord], viewport: &dyn Viewport) -> Result<(), MalformedPacket> {
        let orders = records
            .iter()
            .map(SpawnOrder::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| self.drop_packet(err))?;

        for order in &orders {
            self.spawn(order, viewport);
        }
        Ok(())
    }

    pub fn spawn(&mut self, order: &SpawnOrder, viewport: &dyn Viewport) {
        let level = self.level;
        match *order {
            SpawnOrder::Normal {
                id,
                position,
                direction,
            } => {
                self.spawn_bullet(id, position, PatternKind::Normal, direction, Motion::Linear, level);
            }
            SpawnOrder::Spread {
                id,
                position,
                direction,
                interval,
            } => {
                let interval = interval.unwrap_or(self.config.bullet.spread_interval);
                self.spawn_bullet(
                    id,
                    position,
                    PatternKind::Spread,
                    direction,
                    Motion::spread(interval),
                    level,
                );
            }
            SpawnOrder::Fan {
                id,
                position,
                pivot,
                shots,
            } => {
                let pivot_world = viewport.corner(pivot);
                let sense = fan_sense(position, pivot_world, viewport.center(), shots[pivot.index()]);
                let motion = Motion::Fan {
                    pivot: pivot_world,
                    angular_speed: self.config.bullet.fan_angular_speed(level, sense),
                };
                self.spawn_bullet(id, position, PatternKind::Fan, Vec2::ZERO, motion, level);
            }
            SpawnOrder::Sweep {
                id,
                kind,
                corners,
                branches,
                ratio,
            } => self.start_sweep(id, kind, corners, branches, ratio),
        }
    }

    /// Releases a network-addressable bullet. Unknown ids are a logged no-op.
    pub fn release(&mut self, id: u16) -> Result<(), PoolError> {
        match self.pool.release_by_id(id) {
            Ok(()) => {
                self.stats.bullets_released += 1;
                Ok(())
            }
            Err(err) => {
                if matches!(err, PoolError::ReleaseNotFound { .. }) {
                    self.stats.releases_not_found += 1;
                }
                Err(err)
            }
        }
    }

    /// Steps sweep runs and bullets. Returns the side effects bullets asked for.
    pub fn tick(&mut self, dt: f32, viewport: &dyn Viewport, target: Option<Vec2>) -> Vec<BulletEvent> {
        self.shots.clear();
        for run in &mut self.runs {
            run.advance(dt, viewport, &mut self.shots);
        }
        self.runs.retain(|run| {
            if run.is_finished() {
                log::debug!("{:?} run {} finished", run.kind(), run.id());
            }
            !run.is_finished()
        });

        let shots = std::mem::take(&mut self.shots);
        for shot in &shots {
            self.spawn_shot(shot);
        }
        self.shots = shots;

        let ctx = BulletContext {
            dt,
            viewport,
            target,
        };
        let mut events = Vec::new();
        let mut released = std::mem::take(&mut self.released);
        for (handle, bullet) in self.pool.iter_active_mut() {
            if bullet.tick(&ctx, &mut events).is_some() {
                released.push(handle);
            }
        }

        for &handle in &released {
            match self.pool.release(handle) {
                Ok(()) => self.stats.bullets_released += 1,
                Err(err) => log::warn!("bullet release failed: {err}"),
            }
        }
        released.clear();
        self.released = released;
        events
    }

    fn start_sweep(&mut self, id: u16, kind: SweepKind, corners: [Corner; 2], branches: i32, ratio: f32) {
        if let Some(live) = self.runs.iter().find(|run| run.kind() == kind) {
            log::warn!(
                "ignoring {:?} run {id}: run {} is still live",
                kind,
                live.id()
            );
            self.stats.sweeps_rejected += 1;
            return;
        }

        let plan = SweepPlan::new(kind, corners, branches, ratio, &self.config.sweep);
        log::debug!(
            "{:?} run {id} from {:?}, {} branches, {:.1}s",
            kind,
            corners,
            plan.branches,
            plan.duration()
        );
        self.runs.push(SweepRun::new(id, plan));
        self.stats.sweeps_started += 1;
    }

    fn spawn_shot(&mut self, shot: &SweepShot) {
        let motion = match shot.pattern {
            PatternKind::Winder => Motion::Ramp {
                rate: self.config.bullet.winder_ramp,
                max_scale: self.config.bullet.winder_max_scale,
            },
            _ => Motion::Linear,
        };
        let speed_scale = self.level * shot.speed_scale;
        self.spawn_bullet(0, shot.origin, shot.pattern, shot.direction, motion, speed_scale);
    }

    fn spawn_bullet(
        &mut self,
        id: u16,
        position: Vec2,
        pattern: PatternKind,
        direction: Vec2,
        motion: Motion,
        speed_scale: f32,
    ) {
        let handle = match self.pool.acquire(BULLET_KIND, position, 0.0) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("cannot spawn {} bullet {id}: {err}", pattern.name());
                return;
            }
        };

        let homing = self
            .config
            .bullet
            .homing
            .then(|| self.config.bullet.homing_turn_rate(self.level));
        if let Some(bullet) = self.pool.get_mut(handle) {
            bullet.set_id(id);
            bullet.set_pattern(pattern, direction, motion, speed_scale);
            bullet.set_homing(homing);
        }

        if id != 0 {
            if let Err(err) = self.pool.bind_id(id, handle) {
                log::warn!("bullet {id} not addressable: {err}");
            }
        }
        self.stats.bullets_spawned += 1;
    }

    fn drop_packet(&mut self, err: MalformedPacket) -> MalformedPacket {
        self.stats.packets_dropped += 1;
        log::warn!("dropping spawn packet: {err}");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bullet::BulletState;
    use crate::host::OrthoViewport;
    use crate::net::{QuantizedVec2, ShotDirection, encode_level, encode_release, encode_spawn_packet};

    fn packet(orders: &[SpawnOrder]) -> Vec<u8> {
        let records: Vec<_> = orders.iter().map(|o| o.to_record().unwrap()).collect();
        encode_spawn_packet(&records).unwrap()
    }

    fn normal(id: u16) -> SpawnOrder {
        SpawnOrder::Normal {
            id,
            position: Vec2::new(-12.0, 0.0),
            direction: Vec2::X,
        }
    }

    #[test]
    fn spawns_addressable_bullets() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());

        replica.receive(&packet(&[normal(4), normal(5)]), &viewport).unwrap();
        assert_eq!(replica.active_count(), 2);

        let bullet = replica.bullet_by_id(5).unwrap();
        assert_eq!(bullet.pattern(), Some(PatternKind::Normal));
        assert_eq!(bullet.state(), BulletState::Spawned);
        assert_eq!(bullet.position(), Vec2::new(-12.0, 0.0));
        assert_eq!(replica.stats().bullets_spawned, 2);
    }

    #[test]
    fn one_bad_record_drops_the_packet() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());

        let mut records = vec![normal(1).to_record().unwrap()];
        records.push(SpawnRecord::new(
            2,
            QuantizedVec2::ZERO,
            QuantizedVec2::encode(Vec2::new(0.3, 0.7)),
            PatternKind::Fan,
            0,
        ));
        let data = encode_spawn_packet(&records).unwrap();

        assert!(replica.receive(&data, &viewport).is_err());
        assert!(replica.receive(&data[..data.len() - 1], &viewport).is_err());
        assert_eq!(replica.active_count(), 0);
        assert_eq!(replica.stats().packets_dropped, 2);
        assert_eq!(replica.stats().packets_received, 2);
    }

    #[test]
    fn bullets_leaving_the_screen_are_released() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());

        replica.receive(&packet(&[normal(1), normal(2)]), &viewport).unwrap();
        for _ in 0..360 {
            replica.tick(1.0 / 60.0, &viewport, None);
        }
        assert_eq!(replica.active_count(), 0);
        assert_eq!(replica.stats().bullets_released, 2);
        assert!(replica.released.is_empty());
        let capacity = replica.released.capacity();
        assert!(capacity >= 2);

        replica.receive(&packet(&[normal(3)]), &viewport).unwrap();
        for _ in 0..360 {
            replica.tick(1.0 / 60.0, &viewport, None);
        }
        assert_eq!(replica.active_count(), 0);
        assert_eq!(replica.stats().bullets_released, 3);
        assert_eq!(replica.released.capacity(), capacity);
    }

    #[test]
    fn release_messages_are_idempotent() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());
        replica.receive(&packet(&[normal(8), normal(9)]), &viewport).unwrap();

        replica.receive(&encode_release(8), &viewport).unwrap();
        replica.receive(&encode_release(8), &viewport).unwrap();
        replica.receive(&encode_release(300), &viewport).unwrap();

        assert_eq!(replica.active_count(), 1);
        assert!(replica.bullet_by_id(9).is_some());
        assert_eq!(replica.stats().bullets_released, 1);
        assert_eq!(replica.stats().releases_not_found, 2);
    }

    #[test]
    fn level_updates_scale_new_bullets() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());

        replica.receive(&encode_level(2.0), &viewport).unwrap();
        assert_eq!(replica.level(), 2.0);

        replica.receive(&packet(&[normal(1)]), &viewport).unwrap();
        replica.tick(1.0 / 60.0, &viewport, None);
        let bullet = replica.bullet_by_id(1).unwrap();
        assert!((bullet.velocity().length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn fan_uses_the_transmitted_sense() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());
        let position = Vec2::new(-2.0, -2.0);

        let mut shots = [ShotDirection::None; 4];
        shots[Corner::LeftUpper.index()] = ShotDirection::Clockwise;
        let order = SpawnOrder::Fan {
            id: 3,
            position,
            pivot: Corner::LeftUpper,
            shots,
        };
        replica.receive(&packet(&[order]), &viewport).unwrap();

        let Motion::Fan {
            pivot,
            angular_speed,
        } = *replica.bullet_by_id(3).unwrap().motion()
        else {
            panic!("expected fan motion");
        };
        assert_eq!(pivot, viewport.corner(Corner::LeftUpper));
        assert!((angular_speed + 46f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn live_sweep_rejects_the_same_kind() {
        let viewport = OrthoViewport::default();
        let mut replica = Replica::new(ReplicaConfig::default());
        let sweep = |id, kind| SpawnOrder::Sweep {
            id,
            kind,
            corners: [Corner::LeftUpper, Corner::RightUpper],
            branches: 4,
            ratio: 1.0,
        };

        replica
            .receive(
                &packet(&[
                    sweep(1, SweepKind::Winder),
                    sweep(2, SweepKind::Winder),
                    sweep(3, SweepKind::Cage),
                ]),
                &viewport,
            )
            .unwrap();

        assert_eq!(replica.sweep_runs().len(), 2);
        assert_eq!(replica.stats().sweeps_started, 2);
        assert_eq!(replica.stats().sweeps_rejected, 1);

        replica.tick(1.0 / 60.0, &viewport, None);
        // first volley: 2 runs * 2 corners * 4 shots, none addressable
        assert_eq!(replica.active_count(), 16);
        assert!(replica.bullets().all(|b| b.id() == 0));
    }
}
