use barrage::bullet::SweepKind;
use barrage::net::{Corner, PatternKind, SpawnOrder, encode_spawn_packet};
use barrage::pattern::{DifficultyConfig, PatternConfig};
use barrage::simulation::{DispatchConfig, Replica, ReplicaConfig, SpawnAuthority};
use barrage::{OrthoViewport, Viewport};
use glam::Vec2;

const DT: f32 = 1.0 / 60.0;

fn authority(seed: u64) -> SpawnAuthority {
    SpawnAuthority::new(
        PatternConfig {
            seed: Some(seed),
            ..PatternConfig::default()
        },
        DispatchConfig::default(),
        DifficultyConfig::default(),
    )
}

/// Authority plus its own replica and one remote peer, all on one viewport.
struct Session {
    viewport: OrthoViewport,
    authority: SpawnAuthority,
    host: Replica,
    remote: Replica,
}

impl Session {
    fn new(seed: u64) -> Self {
        Self {
            viewport: OrthoViewport::default(),
            authority: authority(seed),
            host: Replica::new(ReplicaConfig::default()),
            remote: Replica::new(ReplicaConfig::default()),
        }
    }

    fn step(&mut self, target: Option<Vec2>) {
        let requests = self.host.tick(DT, &self.viewport, target);
        self.remote.tick(DT, &self.viewport, target);

        for packet in self.authority.tick(DT, &self.viewport, target, &requests) {
            self.host.receive(&packet, &self.viewport).unwrap();
            self.remote.receive(&packet, &self.viewport).unwrap();
        }
    }
}

fn addressable(replica: &Replica) -> Vec<(u16, Vec2)> {
    let mut bullets: Vec<_> = replica
        .bullets()
        .filter(|b| b.id() != 0)
        .map(|b| (b.id(), b.position()))
        .collect();
    bullets.sort_by_key(|(id, _)| *id);
    bullets
}

#[test]
fn replicas_agree_on_addressable_bullets() {
    let mut session = Session::new(17);
    for pattern in [PatternKind::Normal, PatternKind::Spread, PatternKind::Fan] {
        session.authority.start(pattern);
    }

    for _ in 0..(20 * 60) {
        session.step(Some(Vec2::new(1.0, -0.5)));
    }

    let host = addressable(&session.host);
    let remote = addressable(&session.remote);
    assert!(!host.is_empty());
    assert_eq!(host.len(), remote.len());
    for ((a_id, a_pos), (b_id, b_pos)) in host.iter().zip(&remote) {
        assert_eq!(a_id, b_id);
        assert!(a_pos.distance(*b_pos) < 1e-3, "{a_id}: {a_pos} vs {b_pos}");
    }

    assert_eq!(session.host.stats().packets_dropped, 0);
    assert_eq!(
        session.authority.stats().records_sent,
        session.host.stats().bullets_spawned
    );
}

#[test]
fn release_reaches_every_peer() {
    let mut session = Session::new(3);
    session.authority.start(PatternKind::Normal);

    while addressable(&session.remote).is_empty() {
        session.step(Some(Vec2::ZERO));
    }
    let (id, _) = addressable(&session.remote)[0];

    let release = session.authority.release(id);
    session.host.receive(&release, &session.viewport).unwrap();
    session.remote.receive(&release, &session.viewport).unwrap();
    // a duplicate is harmless
    session.remote.receive(&release, &session.viewport).unwrap();

    assert!(session.host.bullet_by_id(id).is_none());
    assert!(session.remote.bullet_by_id(id).is_none());
    assert_eq!(session.remote.stats().releases_not_found, 1);
}

#[test]
fn no_target_means_no_traffic() {
    let mut session = Session::new(8);
    session.authority.scheduler_mut().start_all();

    for _ in 0..600 {
        session.step(None);
    }
    assert_eq!(session.authority.stats().packets_sent, 0);
    assert_eq!(session.remote.active_count(), 0);
}

fn run_senses(corners: [Corner; 2]) -> [f32; 2] {
    let viewport = OrthoViewport::default();
    let mut replica = Replica::new(ReplicaConfig::default());
    let record = SpawnOrder::Sweep {
        id: 1,
        kind: SweepKind::Winder,
        corners,
        branches: 5,
        ratio: 0.5,
    }
    .to_record()
    .unwrap();

    replica
        .receive(&encode_spawn_packet(&[record]).unwrap(), &viewport)
        .unwrap();
    let run = &replica.sweep_runs()[0];
    assert_eq!(run.plan().corners, corners);
    run.senses()
}

#[test]
fn winder_sweep_senses() {
    let opposite = run_senses([Corner::from_index(0), Corner::from_index(2)]);
    assert_eq!(opposite[0], -opposite[1]);

    let same_half = run_senses([Corner::from_index(0), Corner::from_index(1)]);
    assert_eq!(same_half[0], same_half[1]);
}

#[test]
fn winder_run_fires_from_both_corners_and_expires() {
    let viewport = OrthoViewport::default();
    let mut replica = Replica::new(ReplicaConfig::default());
    let order = SpawnOrder::Sweep {
        id: 40,
        kind: SweepKind::Winder,
        corners: [Corner::RightUpper, Corner::LeftLower],
        branches: 4,
        ratio: 1.0,
    };
    replica.spawn(&order, &viewport);

    replica.tick(DT, &viewport, None);
    let origins: Vec<Vec2> = replica.bullets().map(|b| b.position()).collect();
    assert_eq!(origins.len(), 8);
    let near = |corner: Corner| {
        origins
            .iter()
            .filter(|p| p.distance(viewport.corner(corner)) < 0.5)
            .count()
    };
    assert_eq!(near(Corner::RightUpper), 4);
    assert_eq!(near(Corner::LeftLower), 4);

    // two cycles of 2 s hold + 2 s sweep
    for _ in 0..(9 * 60) {
        replica.tick(DT, &viewport, None);
    }
    assert!(replica.sweep_runs().is_empty());
}
